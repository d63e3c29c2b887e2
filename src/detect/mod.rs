//! Detection layer
//!
//! The object detector is an external collaborator reached through the
//! [`Detector`] trait: it takes an image plus thresholds and returns raw
//! detections in the image's native pixel space. Raw output is converted into
//! typed [`DetectedItem`]s, expressed in reference coordinates, at this
//! boundary - nothing downstream handles the wire shape.

mod stub;

pub use stub::StubDetector;

use anyhow::Result;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point, ReferenceTransform};

/// One raw detection as delivered by the external detector.
///
/// Coordinates are in the analyzed image's native pixel space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    /// Numeric class id from the model
    pub class_id: u32,
    /// Class name from the model's label map
    pub class_name: String,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Bounding box as [x1, y1, x2, y2]
    pub bbox: [f32; 4],
    /// Instance segmentation polygon, when the model provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_polygon: Option<Vec<[f32; 2]>>,
}

/// Contract for the external object detector
pub trait Detector: Send + Sync {
    /// Run detection on an image with the given thresholds
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
        iou_threshold: f32,
    ) -> Result<Vec<RawDetection>>;

    /// Whether the detector is loaded and ready to run
    fn is_ready(&self) -> bool {
        true
    }
}

/// A detected item in reference coordinates, ready for section analysis
#[derive(Debug, Clone)]
pub struct DetectedItem {
    /// Numeric class id from the model
    pub class_id: u32,
    /// Class name from the model's label map
    pub class_name: String,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Bounding box in reference coordinates
    pub bbox: BoundingBox,
    /// Bounding box as reported by the detector, kept for traceability
    pub original_bbox: BoundingBox,
    /// Segmentation polygon in reference coordinates
    pub polygon: Option<Vec<Point>>,
    /// Segmentation polygon as reported by the detector
    pub original_polygon: Option<Vec<Point>>,
    /// Binary segmentation mask, when available
    pub mask: Option<GrayImage>,
    /// Section the item was found in; set by section assignment
    pub section_id: Option<String>,
}

impl DetectedItem {
    /// Build a typed item from raw detector output, normalizing all
    /// geometry into the reference frame.
    pub fn from_raw(raw: RawDetection, transform: &ReferenceTransform) -> Self {
        let original_bbox = BoundingBox::new(raw.bbox[0], raw.bbox[1], raw.bbox[2], raw.bbox[3]);
        let bbox = transform.to_reference(original_bbox);

        let original_polygon: Option<Vec<Point>> = raw
            .mask_polygon
            .map(|points| points.iter().map(|p| Point::new(p[0], p[1])).collect());
        let polygon = original_polygon.as_ref().map(|points| {
            points
                .iter()
                .map(|p| transform.point_to_reference(*p))
                .collect()
        });

        Self {
            class_id: raw.class_id,
            class_name: raw.class_name,
            confidence: raw.confidence,
            bbox,
            original_bbox,
            polygon,
            original_polygon,
            mask: None,
            section_id: None,
        }
    }

    /// Representative point of the item: the polygon centroid (arithmetic
    /// mean of vertices) when a polygon with at least 3 points exists,
    /// otherwise the bounding-box center.
    pub fn center(&self) -> Point {
        match &self.polygon {
            Some(points) if points.len() >= 3 => {
                let n = points.len() as f32;
                let sum_x: f32 = points.iter().map(|p| p.x).sum();
                let sum_y: f32 = points.iter().map(|p| p.y).sum();
                Point::new(sum_x / n, sum_y / n)
            }
            _ => self.bbox.center(),
        }
    }

    /// Area of the segmentation mask in pixels, 0 when no mask exists
    pub fn mask_area(&self) -> f32 {
        match &self.mask {
            Some(mask) => mask.pixels().filter(|p| p.0[0] > 0).count() as f32,
            None => 0.0,
        }
    }

    /// Perimeter of the segmentation polygon, 0 without a valid polygon
    pub fn polygon_perimeter(&self) -> f32 {
        let Some(points) = &self.polygon else {
            return 0.0;
        };
        if points.len() < 3 {
            return 0.0;
        }

        let mut perimeter = 0.0;
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            perimeter += points[i].distance_to(next);
        }
        perimeter
    }
}

/// Normalize a batch of raw detections against the analyzed image's size
pub fn normalize_detections(
    raw: Vec<RawDetection>,
    image_width: u32,
    image_height: u32,
) -> Vec<DetectedItem> {
    let transform = ReferenceTransform::for_image(image_width, image_height);
    raw.into_iter()
        .map(|r| DetectedItem::from_raw(r, &transform))
        .collect()
}
