//! Common regex patterns for Brazilian transfer receipt extraction.
//!
//! All patterns are case-insensitive. Label/value separators accept both
//! whitespace and colons, and `\s` spans line breaks, so a value printed on
//! the line below its label is still found.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::config::{DEFAULT_INSTITUTION_MARKERS, DEFAULT_TAX_ID_MARKERS};

lazy_static! {
    // Amount: "Valor R$ 1.234,56"
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"(?i)Valor\s+R\$\s*([\d.,]+)"
    ).unwrap();

    // Recipient name fragments
    pub static ref DESTINATION_LINE: Regex = Regex::new(
        r"(?i)\bDestino\s+([^\n]+)"
    ).unwrap();

    pub static ref NAME_LINE: Regex = Regex::new(
        r"(?i)\bNome\s+([^\n]+)"
    ).unwrap();

    pub static ref NAME_LABEL_PREFIX: Regex = Regex::new(
        r"(?i)^Nome\b"
    ).unwrap();

    pub static ref NAME_LABEL_WORD: Regex = Regex::new(
        r"(?i)\bNome\b"
    ).unwrap();

    // Destination account details
    pub static ref BRANCH_PATTERN: Regex = Regex::new(
        r"(?i)Ag[êe]ncia[:\s]+(\d{3,5})"
    ).unwrap();

    pub static ref ACCOUNT_PATTERN: Regex = Regex::new(
        r"(?i)\bConta[:\s]+(\d[\d\-]*)"
    ).unwrap();

    pub static ref ACCOUNT_TYPE_PATTERN: Regex = Regex::new(
        r"(?i)Tipo\s+de\s+conta[:\s]+([^\n]+)"
    ).unwrap();

    pub static ref TRANSACTION_ID_PATTERN: Regex = Regex::new(
        r"(?i)ID\s+da\s+transa[çc][ãa]o[:\s]+([A-Za-z0-9\-]{30,})"
    ).unwrap();

    // Institution classification
    pub static ref IP_TOKEN: Regex = Regex::new(
        r"(?i)\bIP\b"
    ).unwrap();

    pub static ref PAYMENT_INSTITUTION_PHRASE: Regex = Regex::new(
        r"(?i)INSTITUI[ÇC][ÃA]O\s+DE\s+PAGAMENTO"
    ).unwrap();

    pub static ref BANK_KEYWORD: Regex = Regex::new(
        r"(?i)BANCO|BCO"
    ).unwrap();

    // Defaults for the configurable marker patterns
    pub static ref INSTITUTION_LINE: Regex =
        institution_pattern(DEFAULT_INSTITUTION_MARKERS).unwrap();

    pub static ref TAX_ID_SUFFIX: Regex =
        tax_id_pattern(DEFAULT_TAX_ID_MARKERS).unwrap();
}

/// Build the pattern for a line opening with one of `markers`.
///
/// The line may carry a leading "Instituição" label. Group 1 holds the
/// institution text from the marker to the end of the line.
pub fn institution_pattern<S: AsRef<str>>(markers: &[S]) -> Result<Regex, regex::Error> {
    let alternation = marker_alternation(markers);
    Regex::new(&format!(
        r"(?im)^[ \t]*(?:institui[çc][ãa]o[ \t:]*)?((?:{alternation})\b[^\n]*)"
    ))
}

/// Build the pattern matching a tax-id label and everything after it.
///
/// The label may open the string, which leaves nothing of the name.
pub fn tax_id_pattern<S: AsRef<str>>(markers: &[S]) -> Result<Regex, regex::Error> {
    let alternation = marker_alternation(markers);
    Regex::new(&format!(r"(?i)(?:^|\s+)(?:{alternation}).*$"))
}

/// Escape markers into a regex alternation, longest first.
///
/// Spaces inside a marker match any run of horizontal whitespace, since OCR
/// rarely preserves spacing. An empty marker list yields a pattern that
/// never matches.
fn marker_alternation<S: AsRef<str>>(markers: &[S]) -> String {
    let mut escaped: Vec<String> = markers
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
        .map(|m| {
            m.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"[ \t]+")
        })
        .collect();

    if escaped.is_empty() {
        return r"[^\s\S]".to_string();
    }

    escaped.sort_by(|a, b| b.len().cmp(&a.len()));
    escaped.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_institution_pattern_allows_label_and_spacing() {
        let pattern = institution_pattern(&["MERCADO PAGO"]).unwrap();

        let caps = pattern.captures("Instituição: Mercado   Pago IP LTDA").unwrap();
        assert_eq!(&caps[1], "Mercado   Pago IP LTDA");

        assert!(pattern.captures("Pago via Mercado Pago").is_none());
    }

    #[test]
    fn test_institution_pattern_requires_whole_marker() {
        let pattern = institution_pattern(&["INTER"]).unwrap();
        assert!(pattern.captures("Internet banking").is_none());
        assert!(pattern.captures("Banco\nINTER S.A.").is_some());
    }

    #[test]
    fn test_empty_marker_list_never_matches() {
        let pattern = tax_id_pattern::<&str>(&[]).unwrap();
        assert!(!pattern.is_match("Maria CNPJ 123"));
    }

    #[test]
    fn test_tax_id_pattern_escapes_markers() {
        let pattern = tax_id_pattern(&["C.P.F"]).unwrap();
        assert!(pattern.is_match("Ana C.P.F 1"));
        assert!(!pattern.is_match("Ana CXPXF 1"));
    }

    #[test]
    fn test_tax_id_pattern_matches_at_start() {
        let pattern = tax_id_pattern(DEFAULT_TAX_ID_MARKERS).unwrap();
        assert_eq!(pattern.replace("CPF 123.456.789-00", ""), "");
        assert_eq!(pattern.replace("Ana Lima CNPJ 1", ""), "Ana Lima");
        assert!(!pattern.is_match("Ana XCPF 1"));
    }
}
