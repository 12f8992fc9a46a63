//! Recipient name assembly.
//!
//! OCR frequently splits the recipient across two lines: one after the
//! "Destino" label and one after "Nome". Some layouts print "Destino" on its
//! own line directly above "Nome ...", in which case the "Destino" capture is
//! the labelled name line itself and must not be used twice.
//!
//! Cleanup runs on the joined string, in this order:
//! 1. drop stray whole-word "Nome" labels,
//! 2. cut at the first tax-id label (the next receipt field often lands on
//!    the same line),
//! 3. collapse whitespace.

use regex::Regex;

use crate::models::receipt::FieldKey;

use super::patterns::{
    tax_id_pattern, DESTINATION_LINE, NAME_LABEL_PREFIX, NAME_LABEL_WORD, NAME_LINE, TAX_ID_SUFFIX,
};
use super::{collapse_whitespace, FieldCandidate, FieldExtractor, FieldOutcome};

/// Merges "Destino" and "Nome" fragments into one recipient name.
#[derive(Debug, Clone)]
pub struct NameAssembler {
    tax_id_suffix: Regex,
}

impl NameAssembler {
    /// Create an assembler using the default tax-id markers.
    pub fn new() -> Self {
        Self {
            tax_id_suffix: TAX_ID_SUFFIX.clone(),
        }
    }

    /// Create an assembler truncating at a custom set of tax-id markers.
    pub fn with_tax_id_markers<S: AsRef<str>>(markers: &[S]) -> Result<Self, regex::Error> {
        Ok(Self {
            tax_id_suffix: tax_id_pattern(markers)?,
        })
    }

    /// Raw name fragments in merge order.
    pub fn fragments<'t>(&self, text: &'t str) -> Vec<FieldCandidate<&'t str>> {
        let mut fragments = Vec::with_capacity(2);

        if let Some(m) = DESTINATION_LINE.captures(text).and_then(|caps| caps.get(1)) {
            let value = m.as_str().trim();
            if !value.is_empty() && !NAME_LABEL_PREFIX.is_match(value) {
                fragments.push(FieldCandidate::new(value, m.as_str(), m.start(), m.end()));
            }
        }

        if let Some(m) = NAME_LINE.captures(text).and_then(|caps| caps.get(1)) {
            let value = m.as_str().trim();
            if !value.is_empty() {
                fragments.push(FieldCandidate::new(value, m.as_str(), m.start(), m.end()));
            }
        }

        fragments
    }

    /// Join and clean the fragments found in `text`.
    pub fn assemble(&self, text: &str) -> Option<FieldCandidate<String>> {
        let fragments = self.fragments(text);
        let first = fragments.first()?;
        let last = fragments.last()?;
        let (start, end) = (first.position.0, last.position.1);

        let joined = fragments
            .iter()
            .map(|f| f.value)
            .collect::<Vec<_>>()
            .join(" ");

        let without_labels = NAME_LABEL_WORD.replace_all(&joined, "");
        let truncated = self.tax_id_suffix.replace(&without_labels, "");
        let name = collapse_whitespace(&truncated);

        if name.is_empty() {
            return None;
        }

        Some(FieldCandidate::new(name, joined, start, end))
    }
}

impl Default for NameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NameAssembler {
    type Output = String;

    fn key(&self) -> FieldKey {
        FieldKey::RecipientName
    }

    fn locate(&self, text: &str) -> FieldOutcome<String> {
        Ok(self.assemble(text))
    }
}

/// Assemble the recipient name from receipt text with default markers.
pub fn assemble_name(text: &str) -> Option<String> {
    NameAssembler::new().assemble(text).map(|c| c.value)
}
