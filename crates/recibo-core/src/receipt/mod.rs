//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{extract, ExtractionResult, ReceiptParser};

use crate::models::receipt::ReceiptRecord;
use crate::ocr::OcrResult;

/// Trait for receipt field extractors.
///
/// Extraction never fails: fields that cannot be located are absent and
/// normalization failures are reported inside the record.
pub trait ReceiptExtractor {
    /// Extract receipt data from an OCR result.
    fn extract(&self, ocr_result: &OcrResult) -> ReceiptRecord;

    /// Extract receipt data from plain text.
    fn extract_from_text(&self, text: &str) -> ReceiptRecord;
}
