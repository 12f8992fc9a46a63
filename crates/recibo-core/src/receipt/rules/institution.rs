//! Destination institution location and type classification.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::receipt::{FieldKey, InstitutionType};

use super::patterns::{
    institution_pattern, BANK_KEYWORD, INSTITUTION_LINE, IP_TOKEN, PAYMENT_INSTITUTION_PHRASE,
};
use super::{collapse_whitespace, FieldCandidate, FieldExtractor, FieldOutcome};

/// Locates the line naming the destination institution.
#[derive(Debug, Clone)]
pub struct InstitutionLocator {
    pattern: Regex,
}

impl InstitutionLocator {
    /// Create a locator using the default marker set.
    pub fn new() -> Self {
        Self {
            pattern: INSTITUTION_LINE.clone(),
        }
    }

    /// Create a locator for a custom marker set.
    pub fn with_markers<S: AsRef<str>>(markers: &[S]) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: institution_pattern(markers)?,
        })
    }
}

impl Default for InstitutionLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InstitutionLocator {
    type Output = String;

    fn key(&self) -> FieldKey {
        FieldKey::Institution
    }

    fn locate(&self, text: &str) -> FieldOutcome<String> {
        let Some(caps) = self.pattern.captures(text) else {
            return Ok(None);
        };
        let Some(line) = caps.get(1) else {
            return Ok(None);
        };

        let value = collapse_whitespace(line.as_str());
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(FieldCandidate::new(
            value,
            line.as_str(),
            line.start(),
            line.end(),
        )))
    }
}

/// Where a classification rule looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationScope {
    /// The located institution text.
    Institution,
    /// The whole recognized receipt text.
    FullText,
}

/// One row of the classification table.
#[derive(Debug)]
pub struct ClassificationRule {
    pub scope: ClassificationScope,
    pub pattern: &'static Regex,
    pub category: InstitutionType,
}

impl ClassificationRule {
    fn matches(&self, institution: &str, full_text: &str) -> bool {
        let haystack = match self.scope {
            ClassificationScope::Institution => institution,
            ClassificationScope::FullText => full_text,
        };
        self.pattern.is_match(haystack)
    }
}

lazy_static! {
    /// Evaluated top to bottom; the first matching row wins.
    pub static ref CLASSIFICATION_RULES: Vec<ClassificationRule> = vec![
        ClassificationRule {
            scope: ClassificationScope::Institution,
            pattern: &IP_TOKEN,
            category: InstitutionType::PaymentInstitution,
        },
        ClassificationRule {
            scope: ClassificationScope::FullText,
            pattern: &PAYMENT_INSTITUTION_PHRASE,
            category: InstitutionType::PaymentInstitution,
        },
        ClassificationRule {
            scope: ClassificationScope::Institution,
            pattern: &BANK_KEYWORD,
            category: InstitutionType::Bank,
        },
    ];
}

/// Classify a located institution, falling back to [`InstitutionType::Other`].
pub fn classify_institution(institution: &str, full_text: &str) -> InstitutionType {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.matches(institution, full_text))
        .map(|rule| rule.category)
        .unwrap_or(InstitutionType::Other)
}
