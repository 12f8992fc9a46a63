//! Core library for Brazilian bank-transfer receipt OCR.
//!
//! This crate provides:
//! - Rule-based field extraction from recognized receipt text (amount,
//!   recipient name, institution, branch, account, account type, transaction id)
//! - Institution type classification (bank / payment institution / other)
//! - Receipt data models and configuration
//! - The text-recognition seam, with a pure Rust OCR engine behind the
//!   `native` feature

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use error::{ExtractionError, OcrError, ReciboError, Result};
pub use models::receipt::{ExtractionResponse, FieldKey, InstitutionType, ReceiptRecord};
pub use ocr::{OcrResult, TextBox, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use receipt::{extract, ExtractionResult, ReceiptExtractor, ReceiptParser};
