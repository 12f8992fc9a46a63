//! Amount extraction for Brazilian receipts.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::models::receipt::FieldKey;

use super::patterns::AMOUNT_PATTERN;
use super::{FieldCandidate, FieldExtractor, FieldOutcome};

/// Amount field extractor ("Valor R$ 1.234,56").
#[derive(Debug, Clone, Copy)]
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = Decimal;

    fn key(&self) -> FieldKey {
        FieldKey::Amount
    }

    fn locate(&self, text: &str) -> FieldOutcome<Decimal> {
        let Some(caps) = AMOUNT_PATTERN.captures(text) else {
            return Ok(None);
        };
        let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
            return Ok(None);
        };

        let amount = parse_brl_amount(token.as_str())?;
        Ok(Some(FieldCandidate::new(
            amount,
            whole.as_str(),
            whole.start(),
            whole.end(),
        )))
    }
}

/// Parse a Brazilian-formatted amount (e.g., "1.234,56").
///
/// Dots are thousands separators and are dropped; the comma is the decimal
/// separator. Anything else that survives normalization is a parse error.
pub fn parse_brl_amount(s: &str) -> Result<Decimal, ExtractionError> {
    let normalized = s.trim().replace('.', "").replace(',', ".");

    Decimal::from_str(&normalized)
        .map_err(|e| ExtractionError::parse(FieldKey::Amount.as_str(), s, e))
}

/// Format amount in Brazilian style (1.234,56).
pub fn format_brl_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_brl_amount() {
        assert_eq!(parse_brl_amount("1.234,56").unwrap(), dec("1234.56"));
        assert_eq!(parse_brl_amount("50,00").unwrap(), dec("50.00"));
        assert_eq!(parse_brl_amount("1.000.000,01").unwrap(), dec("1000000.01"));
        assert_eq!(parse_brl_amount("75").unwrap(), dec("75"));
    }

    #[test]
    fn test_parse_brl_amount_rejects_garbage() {
        let err = parse_brl_amount("1,2,3").unwrap_err();
        assert!(err.to_string().contains("valor"));
        assert!(err.to_string().contains("1,2,3"));

        assert!(parse_brl_amount(".").is_err());
    }

    #[test]
    fn test_format_brl_amount() {
        assert_eq!(format_brl_amount(dec("1234.56")), "1.234,56");
        assert_eq!(format_brl_amount(dec("12345678.9")), "12.345.678,90");
        assert_eq!(format_brl_amount(dec("50")), "50,00");
    }

    #[test]
    fn test_locate_amount() {
        let extractor = AmountExtractor::new();
        let text = "Comprovante\nValor R$ 1.234,56\nData 01/02/2024";

        let found = extractor.locate(text).unwrap().unwrap();
        assert_eq!(found.value, dec("1234.56"));
        assert_eq!(found.source, "Valor R$ 1.234,56");
        assert_eq!(&text[found.position.0..found.position.1], "Valor R$ 1.234,56");
    }

    #[test]
    fn test_locate_amount_case_insensitive_and_split_lines() {
        let extractor = AmountExtractor::new();
        let found = extractor.locate("VALOR\nR$50,00").unwrap().unwrap();
        assert_eq!(found.value, dec("50.00"));
    }

    #[test]
    fn test_locate_amount_missing_is_not_an_error() {
        let extractor = AmountExtractor::new();
        assert_eq!(extractor.locate("Valor total: 10,00").unwrap(), None);
        assert_eq!(extractor.locate("").unwrap(), None);
    }

    #[test]
    fn test_locate_amount_malformed_token() {
        let extractor = AmountExtractor::new();
        assert!(extractor.locate("Valor R$ 10,00,").is_err());
    }
}
