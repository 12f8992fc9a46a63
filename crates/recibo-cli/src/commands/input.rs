//! Turning an input path into recognized receipt text.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use recibo_core::models::config::{OcrConfig, ReciboConfig};
use recibo_core::{PureOcrEngine, TextRecognizer};

/// Image extensions handed to the OCR engine.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "bmp", "webp"];

/// Extensions read as already recognized text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// How an input is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Receipt image, recognized with OCR.
    Image,
    /// Plain text file with OCR output.
    Text,
    /// Recognized text piped on stdin.
    Stdin,
}

impl InputKind {
    /// Classify a path, `-` meaning stdin.
    pub fn detect(path: &Path) -> anyhow::Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(InputKind::Stdin);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(InputKind::Image)
        } else if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            Ok(InputKind::Text)
        } else {
            anyhow::bail!("Unsupported file format: {}", path.display())
        }
    }

    /// Whether a path has an extension this tool can read.
    pub fn is_supported(path: &Path) -> bool {
        path.as_os_str() != "-" && Self::detect(path).is_ok()
    }
}

/// Reads receipt text, loading the OCR engine only when an image shows up.
pub struct ReceiptReader {
    ocr_config: OcrConfig,
    engine: Option<PureOcrEngine>,
}

impl ReceiptReader {
    pub fn new(config: &ReciboConfig, model_dir: Option<PathBuf>) -> Self {
        let mut ocr_config = config.ocr.clone();
        if let Some(dir) = model_dir {
            ocr_config.model_dir = dir;
        }

        Self {
            ocr_config,
            engine: None,
        }
    }

    /// Recognized text for `path`.
    pub fn read(&mut self, path: &Path) -> anyhow::Result<String> {
        let kind = InputKind::detect(path)?;

        if kind != InputKind::Stdin && !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        match kind {
            InputKind::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
            InputKind::Text => Ok(fs::read_to_string(path)?),
            InputKind::Image => {
                let image = image::open(path)?;
                let engine = self.engine()?;
                let result = engine
                    .recognize(&image)
                    .map_err(|e| anyhow::anyhow!("OCR failed: {}", e))?;

                debug!(
                    "OCR detected {} text boxes in {}ms",
                    result.boxes.len(),
                    result.processing_time_ms
                );

                Ok(result.text)
            }
        }
    }

    fn engine(&mut self) -> anyhow::Result<&PureOcrEngine> {
        if self.engine.is_none() {
            if !self.ocr_config.models_present() {
                anyhow::bail!(
                    "OCR models not found in {}.\n\n\
                     Place {}, {} and {} there, or point --model-dir / ocr.model_dir at them.",
                    self.ocr_config.model_dir.display(),
                    self.ocr_config.detection_model,
                    self.ocr_config.recognition_model,
                    self.ocr_config.dictionary
                );
            }

            debug!("Loading OCR models from {}", self.ocr_config.model_dir.display());
            let engine = PureOcrEngine::from_config(self.ocr_config.clone())
                .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
            self.engine = Some(engine);
        }

        self.engine
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("OCR engine unavailable"))
    }
}
