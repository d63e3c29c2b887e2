//! Scripted detector for demos and tests
//!
//! Returns a fixed detection set regardless of image content, so the
//! analysis pipeline can run end to end without model weights.

use anyhow::Result;
use image::DynamicImage;
use tracing::debug;

use super::{Detector, RawDetection};

/// Detector that replays a scripted list of detections
#[derive(Debug, Clone, Default)]
pub struct StubDetector {
    detections: Vec<RawDetection>,
}

impl StubDetector {
    /// Create a stub with an explicit detection script
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }

    /// A demo script over the sample planogram layout: correctly placed
    /// cereals, snacks and beverages plus a few deliberate misplacements.
    pub fn demo() -> Self {
        let items: [(u32, &str, f32, [f32; 4]); 10] = [
            // Cereals - top shelf (0,0)-(300,100)
            (0, "cereal_box", 0.92, [30.0, 20.0, 80.0, 90.0]),
            (1, "granola", 0.87, [120.0, 25.0, 170.0, 95.0]),
            // Cereals - middle shelf (0,100)-(300,200)
            (0, "cereal_box", 0.90, [40.0, 110.0, 90.0, 190.0]),
            (0, "cereal_box", 0.85, [150.0, 115.0, 200.0, 195.0]),
            // Snacks - top shelf (300,0)-(600,100)
            (2, "chips", 0.88, [330.0, 15.0, 390.0, 85.0]),
            (3, "cookies", 0.83, [450.0, 20.0, 510.0, 90.0]),
            // Beverages (300,100)-(600,200)
            (4, "bottle", 0.91, [320.0, 120.0, 360.0, 190.0]),
            (5, "can", 0.86, [420.0, 130.0, 460.0, 185.0]),
            // Misplaced: a can on the snack shelf, a cereal box among beverages
            (5, "can", 0.81, [550.0, 30.0, 590.0, 85.0]),
            (0, "cereal_box", 0.79, [520.0, 110.0, 570.0, 190.0]),
        ];

        let detections = items
            .into_iter()
            .map(|(class_id, class_name, confidence, bbox)| RawDetection {
                class_id,
                class_name: class_name.to_string(),
                confidence,
                bbox,
                mask_polygon: None,
            })
            .collect();

        Self { detections }
    }
}

impl Detector for StubDetector {
    fn detect(
        &self,
        _image: &DynamicImage,
        confidence_threshold: f32,
        _iou_threshold: f32,
    ) -> Result<Vec<RawDetection>> {
        let detections: Vec<RawDetection> = self
            .detections
            .iter()
            .filter(|d| d.confidence >= confidence_threshold)
            .cloned()
            .collect();
        debug!(
            "Stub detector returned {} of {} scripted detections",
            detections.len(),
            self.detections.len()
        );
        Ok(detections)
    }
}
