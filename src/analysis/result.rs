//! Analysis result assembly
//!
//! Packages one run's findings into a single immutable bundle, with row
//! conversions suitable for any tabular or JSON sink.

use image::RgbaImage;
use serde::Serialize;
use uuid::Uuid;

use super::inventory::DetailedInventoryStatus;
use super::misplacement::MisplacedItem;
use super::tasks::Task;
use crate::detect::DetectedItem;
use crate::planogram::PlanogramSection;

/// Everything produced by one analysis run
#[derive(Debug)]
pub struct AnalysisResult {
    /// Unique id of this run
    pub analysis_id: Uuid,
    pub detected_items: Vec<DetectedItem>,
    pub misplaced_items: Vec<MisplacedItem>,
    pub inventory: Vec<DetailedInventoryStatus>,
    pub tasks: Vec<Task>,
    /// Overall compliance score, 0-100
    pub compliance_score: f32,
    /// Annotated copy of the analyzed image
    pub annotated_image: Option<RgbaImage>,
    /// Set when the run could not produce findings
    pub error: Option<String>,
}

impl AnalysisResult {
    /// An empty result carrying an error message.
    ///
    /// Analysis never surfaces partial state: any failure inside the
    /// pipeline collapses to this shape.
    pub fn empty_with_error(message: impl Into<String>) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            detected_items: Vec::new(),
            misplaced_items: Vec::new(),
            inventory: Vec::new(),
            tasks: Vec::new(),
            compliance_score: 0.0,
            annotated_image: None,
            error: Some(message.into()),
        }
    }

    /// One row per detected item
    pub fn detected_rows(&self) -> Vec<DetectedItemRow> {
        self.detected_items
            .iter()
            .map(|item| {
                let center = item.center();
                DetectedItemRow {
                    class_id: item.class_id,
                    class_name: item.class_name.clone(),
                    confidence: item.confidence,
                    x1: item.bbox.x1,
                    y1: item.bbox.y1,
                    x2: item.bbox.x2,
                    y2: item.bbox.y2,
                    center_x: center.x,
                    center_y: center.y,
                    section_id: item.section_id.clone(),
                    has_mask: item.mask.is_some(),
                    mask_area: item.mask_area(),
                    mask_perimeter: item.polygon_perimeter(),
                }
            })
            .collect()
    }

    /// One row per misplaced item
    pub fn misplaced_rows(&self) -> Vec<MisplacedItemRow> {
        self.misplaced_items
            .iter()
            .map(|m| {
                let center = m.item.center();
                MisplacedItemRow {
                    item_class: m.item.class_name.clone(),
                    confidence: m.item.confidence,
                    expected_section: m.expected_section.clone(),
                    actual_section: m
                        .actual_section
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    distance_from_expected: (m.distance * 100.0).round() / 100.0,
                    center_x: center.x,
                    center_y: center.y,
                }
            })
            .collect()
    }

    /// One row per (section, item type) breakdown entry
    pub fn inventory_rows(&self) -> Vec<InventoryRow> {
        self.inventory
            .iter()
            .flat_map(|status| {
                status.breakdown.iter().map(|row| InventoryRow {
                    section_id: status.section_id.clone(),
                    section_name: status.section_name.clone(),
                    item_type: row.item_type.clone(),
                    expected: row.expected,
                    expected_visible: row.expected_visible,
                    detected_in_section: row.detected_in_section,
                    found_elsewhere: row.found_elsewhere,
                    total_available: row.total_available,
                    shortage: row.shortage,
                    surplus: row.surplus,
                    availability_status: row.status.to_string(),
                })
            })
            .collect()
    }
}

/// Tabular row for a detected item
#[derive(Debug, Clone, Serialize)]
pub struct DetectedItemRow {
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub section_id: Option<String>,
    pub has_mask: bool,
    pub mask_area: f32,
    pub mask_perimeter: f32,
}

/// Tabular row for a misplaced item
#[derive(Debug, Clone, Serialize)]
pub struct MisplacedItemRow {
    pub item_class: String,
    pub confidence: f32,
    pub expected_section: String,
    pub actual_section: String,
    pub distance_from_expected: f32,
    pub center_x: f32,
    pub center_y: f32,
}

/// Tabular row for one (section, item type) inventory cell
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRow {
    pub section_id: String,
    pub section_name: String,
    pub item_type: String,
    pub expected: u32,
    pub expected_visible: u32,
    pub detected_in_section: u32,
    pub found_elsewhere: u32,
    pub total_available: u32,
    pub shortage: u32,
    pub surplus: u32,
    pub availability_status: String,
}

/// Overall compliance score between 0 and 100.
///
/// Weighted blend of placement accuracy (share of detections in a correct
/// location) and inventory fill (detections against total expectation).
pub fn compliance_score(
    sections: &[PlanogramSection],
    detected: &[DetectedItem],
    misplaced: &[MisplacedItem],
) -> f32 {
    if sections.is_empty() {
        return 0.0;
    }

    let total_expected: u32 = sections.iter().map(|s| s.expected_count).sum();
    let total_detected = detected.len() as f32;
    let total_misplaced = misplaced.len() as f32;

    if total_expected == 0 {
        return if detected.is_empty() { 100.0 } else { 0.0 };
    }

    let placement_score = if total_detected > 0.0 {
        ((total_detected - total_misplaced) / total_detected * 100.0).max(0.0)
    } else {
        0.0
    };
    let inventory_score = (total_detected / total_expected as f32 * 100.0).min(100.0);

    placement_score * 0.6 + inventory_score * 0.4
}
