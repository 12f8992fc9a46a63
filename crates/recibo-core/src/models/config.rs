//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReciboError, Result};

/// Institution markers a destination line may start with.
pub const DEFAULT_INSTITUTION_MARKERS: &[&str] = &[
    "BCO",
    "BANCO",
    "SANTANDER",
    "BRADESCO",
    "ITAÚ",
    "ITAU",
    "INTER",
    "CAIXA",
    "MERCADO PAGO",
];

/// Tax-id labels that end a recipient name.
pub const DEFAULT_TAX_ID_MARKERS: &[&str] = &["CNPJ", "CNPF", "CNPP", "CPF"];

/// Main configuration for the recibo pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Vertical distance (pixels) under which two text boxes share a line.
    pub line_tolerance_px: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
            line_tolerance_px: 15.0,
        }
    }
}

impl OcrConfig {
    /// Full path to the detection model.
    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    /// Full path to the recognition model.
    pub fn recognition_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }

    /// Full path to the character dictionary.
    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(&self.dictionary)
    }

    /// Whether all model files are present on disk.
    pub fn models_present(&self) -> bool {
        self.detection_path().exists()
            && self.recognition_path().exists()
            && self.dictionary_path().exists()
    }
}

/// Receipt field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Markers that open the destination institution line.
    pub institution_markers: Vec<String>,

    /// Labels that truncate the assembled recipient name.
    pub tax_id_markers: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            institution_markers: DEFAULT_INSTITUTION_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            tax_id_markers: DEFAULT_TAX_ID_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Include the recognized text next to the extracted data.
    pub include_ocr_text: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_ocr_text: true,
            pretty: false,
        }
    }
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the extraction rules cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.institution_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ReciboError::Config(
                "extraction.institution_markers must contain at least one marker".to_string(),
            ));
        }
        if self.ocr.line_tolerance_px < 0.0 {
            return Err(ReciboError::Config(
                "ocr.line_tolerance_px must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
