//! Rule-based field extractors for Brazilian transfer receipts.

pub mod amount;
pub mod fields;
pub mod institution;
pub mod name;
pub mod patterns;

pub use amount::{format_brl_amount, parse_brl_amount, AmountExtractor};
pub use fields::{Normalize, TextFieldRule, TEXT_FIELD_RULES};
pub use institution::{
    classify_institution, ClassificationRule, ClassificationScope, InstitutionLocator,
    CLASSIFICATION_RULES,
};
pub use name::{assemble_name, NameAssembler};

use crate::error::ExtractionError;
use crate::models::receipt::FieldKey;

/// Outcome of one field attempt: found, not found, or failed to normalize.
pub type FieldOutcome<T> = Result<Option<FieldCandidate<T>>, ExtractionError>;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Record key the extracted value is stored under.
    fn key(&self) -> FieldKey;

    /// Locate and normalize the field in `text`.
    ///
    /// `Ok(None)` means the field is absent, which is not an error.
    fn locate(&self, text: &str) -> FieldOutcome<Self::Output>;
}

/// A located value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate<T> {
    /// Normalized value.
    pub value: T,
    /// Byte span of the match in the source text.
    pub position: (usize, usize),
    /// Source text that was matched.
    pub source: String,
}

impl<T> FieldCandidate<T> {
    pub fn new(value: T, source: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value,
            position: (start, end),
            source: source.into(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldCandidate<U> {
        FieldCandidate {
            value: f(self.value),
            position: self.position,
            source: self.source,
        }
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  BANCO \t ITAÚ\r\n S.A. "), "BANCO ITAÚ S.A.");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_candidate_map_keeps_span() {
        let candidate = FieldCandidate::new("0001", "Agência 0001", 10, 22);
        let mapped = candidate.map(|v| v.len());
        assert_eq!(mapped.value, 4);
        assert_eq!(mapped.position, (10, 22));
        assert_eq!(mapped.source, "Agência 0001");
    }
}
