//! Planogram compliance analysis
//!
//! One analysis run takes a shelf photograph through detection, coordinate
//! normalization, section assignment, misplacement detection, inventory
//! classification and task generation, and returns a single immutable
//! [`AnalysisResult`]. Runs share nothing but the loaded planogram snapshot.

pub mod inventory;
pub mod misplacement;
pub mod result;
pub mod tasks;

pub use inventory::{AvailabilityStatus, DetailedInventoryStatus, ItemBreakdown};
pub use misplacement::MisplacedItem;
pub use result::{AnalysisResult, DetectedItemRow, InventoryRow, MisplacedItemRow};
pub use tasks::{Task, TaskType};

use anyhow::Result;
use image::DynamicImage;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::detect::{self, DetectedItem, Detector};
use crate::planogram::settings::DetectionSettings;
use crate::planogram::{PlanogramConfig, PlanogramError};
use crate::render;

/// Assign each detected item to the section containing its representative
/// point, or to no section when it sits outside every declared region.
pub fn assign_sections(items: &mut [DetectedItem], config: &PlanogramConfig) {
    for item in items.iter_mut() {
        let center = item.center();
        item.section_id = config
            .find_section_by_position(center.x, center.y)
            .map(|s| s.section_id.clone());
    }
}

/// Session-level compliance engine.
///
/// Holds the current planogram snapshot behind a lock that is swapped
/// wholesale on reload; every run clones the `Arc` once on entry, so
/// concurrent runs each see a consistent configuration.
pub struct ComplianceEngine {
    planogram: RwLock<Option<Arc<PlanogramConfig>>>,
    detector: Option<Box<dyn Detector>>,
    detection: DetectionSettings,
}

impl ComplianceEngine {
    /// Create an engine with no detector attached
    pub fn new(detection: DetectionSettings) -> Self {
        Self {
            planogram: RwLock::new(None),
            detector: None,
            detection,
        }
    }

    /// Create an engine backed by the given detector
    pub fn with_detector(detection: DetectionSettings, detector: Box<dyn Detector>) -> Self {
        Self {
            planogram: RwLock::new(None),
            detector: Some(detector),
            detection,
        }
    }

    /// Load a planogram document from disk and swap it in as the current
    /// snapshot
    pub fn load_planogram(&self, path: &Path) -> Result<(), PlanogramError> {
        let config = PlanogramConfig::load(path)?;
        self.set_planogram(config);
        Ok(())
    }

    /// Replace the current planogram snapshot
    pub fn set_planogram(&self, config: PlanogramConfig) {
        info!("Planogram snapshot replaced: {} sections", config.sections.len());
        *self.planogram.write() = Some(Arc::new(config));
    }

    /// The current planogram snapshot, if one is loaded
    pub fn planogram(&self) -> Option<Arc<PlanogramConfig>> {
        self.planogram.read().clone()
    }

    /// Run one full analysis over a shelf photograph.
    ///
    /// Total: configuration or detector problems and any pipeline failure
    /// collapse into an empty result carrying an error message, never a
    /// partial one.
    pub fn analyze(&self, image: &DynamicImage) -> AnalysisResult {
        let Some(config) = self.planogram() else {
            return AnalysisResult::empty_with_error("no planogram configuration loaded");
        };

        if image.width() == 0 || image.height() == 0 {
            return AnalysisResult::empty_with_error("image has zero width or height");
        }

        match self.run_pipeline(&config, image) {
            Ok(result) => result,
            Err(e) => {
                warn!("Analysis failed: {:#}", e);
                AnalysisResult::empty_with_error(format!("analysis failed: {e}"))
            }
        }
    }

    fn run_pipeline(
        &self,
        config: &PlanogramConfig,
        image: &DynamicImage,
    ) -> Result<AnalysisResult> {
        let raw = match &self.detector {
            Some(detector) if detector.is_ready() => detector.detect(
                image,
                self.detection.confidence_threshold,
                self.detection.iou_threshold,
            )?,
            _ => {
                warn!("No detector available; analyzing with an empty detection set");
                Vec::new()
            }
        };

        let mut items = detect::normalize_detections(raw, image.width(), image.height());
        assign_sections(&mut items, config);

        let misplaced = misplacement::find_misplaced(&items, config);
        let inventory = inventory::build_inventory(config, &items, &misplaced);
        let tasks = tasks::generate_tasks(&misplaced, &inventory);
        let score = result::compliance_score(&config.sections, &items, &misplaced);
        let annotated = render::annotate(image, &items, &misplaced, &config.sections);

        info!(
            "Analysis complete: {} items, {} misplaced, {} tasks, score {:.1}",
            items.len(),
            misplaced.len(),
            tasks.len(),
            score
        );

        Ok(AnalysisResult {
            analysis_id: Uuid::new_v4(),
            detected_items: items,
            misplaced_items: misplaced,
            inventory,
            tasks,
            compliance_score: score,
            annotated_image: Some(annotated),
            error: None,
        })
    }
}
