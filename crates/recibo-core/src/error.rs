//! Error types for the recibo-core library.

use thiserror::Error;

/// Main error type for the recibo library.
#[derive(Error, Debug)]
pub enum ReciboError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Receipt field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the text-recognition collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Unexpected failures while normalizing a located field.
///
/// A field that simply is not present is never an error; these only
/// describe values that matched a pattern but could not be normalized.
/// The `Display` text is what ends up under `erro_extracao`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A matched value could not be parsed.
    #[error("failed to parse {field} from '{value}': {reason}")]
    Parse {
        field: String,
        value: String,
        reason: String,
    },
}

impl ExtractionError {
    pub fn parse(field: impl Into<String>, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for the recibo library.
pub type Result<T> = std::result::Result<T, ReciboError>;
