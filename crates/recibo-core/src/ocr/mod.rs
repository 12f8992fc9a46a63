//! Text recognition seam.
//!
//! The extraction engine only consumes text. Anything that can turn a
//! receipt image into [`OcrResult`] implements [`TextRecognizer`]; the
//! `native` feature ships one backed by `pure-onnx-ocr`.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Anything that recognizes text in a receipt image.
pub trait TextRecognizer {
    /// Recognize text boxes and assemble them into reading-order lines.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Convenience: recognized text only.
    fn recognize_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.recognize(image)?.text)
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    pub fn new(text: impl Into<String>, bbox: [f32; 8], confidence: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected and recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Full text, one receipt row per line.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Wrap text that was recognized elsewhere.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            boxes: Vec::new(),
            text: text.into(),
            processing_time_ms: 0,
            image_size: (0, 0),
        }
    }

    /// Build a result from boxes, grouping them into lines.
    pub fn from_boxes(
        boxes: Vec<TextBox>,
        line_tolerance: f32,
        image_size: (u32, u32),
        processing_time_ms: u64,
    ) -> Self {
        let text = group_into_lines(&boxes, line_tolerance);
        Self {
            boxes,
            text,
            processing_time_ms,
            image_size,
        }
    }
}

/// Join boxes into reading-order text.
///
/// Boxes whose centers lie within `tolerance` pixels vertically of a row's
/// first box belong to that row. Rows are emitted top to bottom, boxes in a
/// row left to right separated by a space, so a label and its value printed
/// side by side end up on one line.
pub fn group_into_lines(boxes: &[TextBox], tolerance: f32) -> String {
    let mut ordered: Vec<&TextBox> = boxes.iter().filter(|b| !b.text.trim().is_empty()).collect();
    ordered.sort_by(|a, b| a.center().1.total_cmp(&b.center().1));

    let mut rows: Vec<(f32, Vec<&TextBox>)> = Vec::new();
    for text_box in ordered {
        let y = text_box.center().1;
        let same_row = rows
            .last()
            .is_some_and(|(row_y, _)| (y - row_y).abs() <= tolerance);

        if same_row {
            if let Some((_, row)) = rows.last_mut() {
                row.push(text_box);
            }
        } else {
            rows.push((y, vec![text_box]));
        }
    }

    rows.into_iter()
        .map(|(_, mut row)| {
            row.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
            row.iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x: f32, y: f32) -> TextBox {
        let (w, h) = (100.0, 20.0);
        TextBox::new(text, [x, y, x + w, y, x + w, y + h, x, y + h], 0.9)
    }

    #[test]
    fn test_rect_and_center() {
        let b = text_box("Valor", 10.0, 40.0);
        assert_eq!(b.rect(), (10.0, 40.0, 110.0, 60.0));
        assert_eq!(b.center(), (60.0, 50.0));
    }

    #[test]
    fn test_group_into_lines() {
        let boxes = vec![
            text_box("R$ 50,00", 200.0, 102.0),
            text_box("Comprovante", 10.0, 10.0),
            text_box("Valor", 10.0, 100.0),
            text_box("  ", 10.0, 150.0),
            text_box("Destino", 10.0, 200.0),
        ];

        assert_eq!(
            group_into_lines(&boxes, 15.0),
            "Comprovante\nValor R$ 50,00\nDestino"
        );
    }

    #[test]
    fn test_from_text() {
        let result = OcrResult::from_text("Nome Maria");
        assert!(result.boxes.is_empty());
        assert_eq!(result.text, "Nome Maria");
    }

    #[test]
    fn test_from_boxes_keeps_boxes() {
        let boxes = vec![text_box("Agência", 0.0, 0.0), text_box("0001", 120.0, 3.0)];
        let result = OcrResult::from_boxes(boxes, 15.0, (640, 480), 12);
        assert_eq!(result.text, "Agência 0001");
        assert_eq!(result.boxes.len(), 2);
        assert_eq!(result.image_size, (640, 480));
    }

    struct FixedRecognizer(&'static str);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
            Ok(OcrResult::from_text(self.0))
        }
    }

    #[test]
    fn test_recognize_text_default() {
        let image = DynamicImage::new_rgb8(4, 4);
        let text = FixedRecognizer("Valor R$ 1,00").recognize_text(&image).unwrap();
        assert_eq!(text, "Valor R$ 1,00");
    }
}
