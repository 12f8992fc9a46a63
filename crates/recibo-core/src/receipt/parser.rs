//! Receipt parser: runs every field rule and assembles the record.

use lazy_static::lazy_static;
use tracing::{debug, info, trace, warn};

use crate::error::{ExtractionError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{FieldKey, ReceiptRecord};
use crate::ocr::OcrResult;

use super::rules::{
    classify_institution, AmountExtractor, FieldCandidate, FieldExtractor, InstitutionLocator,
    NameAssembler, TEXT_FIELD_RULES,
};
use super::ReceiptExtractor;

lazy_static! {
    static ref DEFAULT_PARSER: ReceiptParser = ReceiptParser::new();
}

/// Extract a receipt record from recognized text using the default rules.
pub fn extract(text: &str) -> ReceiptRecord {
    DEFAULT_PARSER.parse(text).record
}

/// Result of receipt extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Extracted receipt data.
    pub record: ReceiptRecord,
    /// Raw recognized text.
    pub raw_text: String,
    /// Fields that could not be located.
    pub missing_fields: Vec<FieldKey>,
    /// Normalization failures, already summarized in `record.extraction_error`.
    pub failures: Vec<ExtractionError>,
}

/// Rule-based receipt parser.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    amount: AmountExtractor,
    name: NameAssembler,
    institution: InstitutionLocator,
}

impl ReceiptParser {
    /// Create a parser with the default marker sets.
    pub fn new() -> Self {
        Self {
            amount: AmountExtractor::new(),
            name: NameAssembler::new(),
            institution: InstitutionLocator::new(),
        }
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Self::new()
            .with_institution_markers(&config.institution_markers)?
            .with_tax_id_markers(&config.tax_id_markers)
    }

    /// Replace the institution markers.
    pub fn with_institution_markers<S: AsRef<str>>(mut self, markers: &[S]) -> Result<Self> {
        self.institution = InstitutionLocator::with_markers(markers)?;
        Ok(self)
    }

    /// Replace the tax-id markers that end a recipient name.
    pub fn with_tax_id_markers<S: AsRef<str>>(mut self, markers: &[S]) -> Result<Self> {
        self.name = NameAssembler::with_tax_id_markers(markers)?;
        Ok(self)
    }

    /// Parse a receipt from recognized text.
    ///
    /// Every field is attempted independently. A field that fails to
    /// normalize is left out and its failure is attached to the record once
    /// all fields have been tried.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        info!("Parsing receipt from {} characters of text", text.len());

        let mut record = ReceiptRecord::default();
        let mut failures = Vec::new();

        if let Some(amount) = attempt(&self.amount, text, &mut failures) {
            record.amount = Some(amount.value);
        }

        if let Some(name) = attempt(&self.name, text, &mut failures) {
            record.recipient_name = Some(name.value);
        }

        if let Some(institution) = attempt(&self.institution, text, &mut failures) {
            let category = classify_institution(&institution.value, text);
            debug!("Classified '{}' as {}", institution.value, category);
            record.institution_type = Some(category);
            record.institution = Some(institution.value);
        }

        for rule in TEXT_FIELD_RULES.iter() {
            if let Some(found) = attempt(rule, text, &mut failures) {
                record.set_text(rule.key, found.value);
            }
        }

        if !failures.is_empty() {
            record.extraction_error = Some(
                failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            );
        }

        let missing_fields = record.missing_fields();

        debug!(
            "Extracted {} of {} receipt fields ({} failures)",
            FieldKey::ALL.len() - missing_fields.len(),
            FieldKey::ALL.len(),
            failures.len()
        );

        ExtractionResult {
            record,
            raw_text: text.to_string(),
            missing_fields,
            failures,
        }
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptExtractor for ReceiptParser {
    fn extract(&self, ocr_result: &OcrResult) -> ReceiptRecord {
        debug!(
            "Extracting receipt from {} OCR boxes recognized in {}ms",
            ocr_result.boxes.len(),
            ocr_result.processing_time_ms
        );
        self.parse(&ocr_result.text).record
    }

    fn extract_from_text(&self, text: &str) -> ReceiptRecord {
        self.parse(text).record
    }
}

/// Run one extractor, logging the outcome and collecting any failure.
fn attempt<E: FieldExtractor>(
    extractor: &E,
    text: &str,
    failures: &mut Vec<ExtractionError>,
) -> Option<FieldCandidate<E::Output>> {
    match extractor.locate(text) {
        Ok(Some(candidate)) => {
            debug!(
                "Located {} at {}..{}: '{}'",
                extractor.key(),
                candidate.position.0,
                candidate.position.1,
                candidate.source
            );
            Some(candidate)
        }
        Ok(None) => {
            trace!("No match for {}", extractor.key());
            None
        }
        Err(e) => {
            warn!("Could not normalize {}: {}", extractor.key(), e);
            failures.push(e);
            None
        }
    }
}
