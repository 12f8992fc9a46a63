//! WASM bindings for Brazilian transfer receipt field extraction.
//!
//! Text recognition happens on the JavaScript side; these bindings take the
//! recognized text (or the raw boxes) and return the structured record.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use recibo_core::models::config::OcrConfig;
use recibo_core::receipt::rules;
use recibo_core::{ExtractionResponse, OcrResult, ReceiptParser, ReceiptRecord, TextBox};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(record: &ReceiptRecord) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(record).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract receipt data from recognized text.
///
/// Returns an object keyed by the Portuguese field names (`valor`,
/// `destino_nome`, ...). Fields that were not found are absent.
#[wasm_bindgen]
pub fn extract_receipt_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&recibo_core::extract(text))
}

/// Extract receipt data and return the JSON response envelope as a string.
#[wasm_bindgen]
pub fn extract_receipt_json(text: &str) -> Result<String, JsValue> {
    let response = ExtractionResponse::success(recibo_core::extract(text), Some(text.to_string()));
    serde_json::to_string(&response).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse a Brazilian-formatted amount (e.g., "1.234,56").
#[wasm_bindgen]
pub fn parse_brl_amount(amount: &str) -> Option<f64> {
    rules::parse_brl_amount(amount).ok().and_then(|d| d.to_f64())
}

/// Format an amount in Brazilian style (1.234,56).
#[wasm_bindgen]
pub fn format_brl_amount(amount: f64) -> String {
    match Decimal::try_from(amount) {
        Ok(d) => rules::format_brl_amount(d.round_dp(2)),
        Err(_) => format!("{:.2}", amount),
    }
}

/// Classify an institution name as "Banco", "Instituição de Pagamento" or "Outro".
#[wasm_bindgen]
pub fn classify_institution(institution: &str, full_text: &str) -> String {
    rules::classify_institution(institution, full_text).to_string()
}

/// Receipt extractor class with configurable marker sets.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    parser: ReceiptParser,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create a new receipt extractor with the default markers.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: ReceiptParser::new(),
        }
    }

    /// Replace the words that open an institution line (e.g. "BANCO").
    #[wasm_bindgen]
    pub fn set_institution_markers(&mut self, markers: Vec<String>) -> Result<(), JsValue> {
        self.parser = self
            .parser
            .clone()
            .with_institution_markers(&markers)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Replace the tax-id markers that end a recipient name (e.g. "CNPJ").
    #[wasm_bindgen]
    pub fn set_tax_id_markers(&mut self, markers: Vec<String>) -> Result<(), JsValue> {
        self.parser = self
            .parser
            .clone()
            .with_tax_id_markers(&markers)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Extract a receipt from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(text).record)
    }

    /// Get extraction result with the fields that were not found.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(text);

        #[derive(serde::Serialize)]
        struct ExtractResult {
            record: ReceiptRecord,
            raw_text: String,
            missing_fields: Vec<&'static str>,
            failures: Vec<String>,
        }

        let output = ExtractResult {
            missing_fields: result.missing_fields.iter().map(|k| k.as_str()).collect(),
            failures: result.failures.iter().map(ToString::to_string).collect(),
            record: result.record,
            raw_text: result.raw_text,
        };

        serde_wasm_bindgen::to_value(&output).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// OCR boxes recognized in the browser, grouped into lines before extraction.
#[wasm_bindgen]
pub struct OcrResultJs {
    boxes: Vec<TextBox>,
    line_tolerance: f32,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            line_tolerance: OcrConfig::default().line_tolerance_px,
        }
    }

    /// Vertical distance, in pixels, within which boxes share a line.
    #[wasm_bindgen]
    pub fn set_line_tolerance(&mut self, tolerance: f32) {
        self.line_tolerance = tolerance.max(0.0);
    }

    /// Add a text box to the result.
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.boxes
            .push(TextBox::new(text, [x1, y1, x2, y2, x3, y3, x4, y4], confidence));
    }

    /// Get the text in reading order.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.to_result().text
    }

    /// Extract a receipt from this OCR result.
    #[wasm_bindgen]
    pub fn extract_receipt(&self) -> Result<JsValue, JsValue> {
        extract_receipt_from_text(&self.get_text())
    }

    fn to_result(&self) -> OcrResult {
        OcrResult::from_boxes(self.boxes.clone(), self.line_tolerance, (0, 0), 0)
    }
}

impl Default for OcrResultJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_parse_brl_amount() {
        let amount = parse_brl_amount("1.234,56");
        assert!(amount.is_some());
        assert!((amount.unwrap() - 1234.56).abs() < 0.001);
        assert_eq!(parse_brl_amount("1,2,3"), None);
    }

    #[wasm_bindgen_test]
    fn test_format_brl_amount() {
        assert_eq!(format_brl_amount(1234.56), "1.234,56");
        assert_eq!(format_brl_amount(50.0), "50,00");
    }

    #[wasm_bindgen_test]
    fn test_classify_institution() {
        assert_eq!(
            classify_institution("BCO MERCADO PAGO IP", ""),
            "Instituição de Pagamento"
        );
        assert_eq!(classify_institution("BANCO DO BRASIL", ""), "Banco");
        assert_eq!(classify_institution("COOPERATIVA", ""), "Outro");
    }

    #[wasm_bindgen_test]
    fn test_extract_json_envelope() {
        let json = extract_receipt_json("Valor R$ 50,00").unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"valor\":50.0"));
    }

    #[wasm_bindgen_test]
    fn test_boxes_grouped_into_lines() {
        let mut ocr = OcrResultJs::new();
        ocr.add_box("R$ 50,00", 80.0, 10.0, 160.0, 10.0, 160.0, 30.0, 80.0, 30.0, 0.9);
        ocr.add_box("Valor", 0.0, 12.0, 60.0, 12.0, 60.0, 32.0, 0.0, 32.0, 0.9);
        ocr.add_box("Agência 0001", 0.0, 60.0, 90.0, 60.0, 90.0, 80.0, 0.0, 80.0, 0.9);

        assert_eq!(ocr.get_text(), "Valor R$ 50,00\nAgência 0001");
    }
}
