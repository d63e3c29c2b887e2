//! Engine settings
//!
//! Deployment-level knobs stored in TOML format, separate from the planogram
//! documents themselves: detector thresholds and where documents and images
//! live on disk.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Detection settings
    pub detection: DetectionSettings,
    /// Filesystem paths
    pub paths: PathSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            detection: DetectionSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

/// Thresholds passed to the external detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Minimum confidence for a detection to be kept (0.0 - 1.0)
    pub confidence_threshold: f32,
    /// IoU threshold for the detector's non-maximum suppression
    pub iou_threshold: f32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.4,
        }
    }
}

/// Where planogram documents and reference images live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory holding planogram JSON documents
    pub planogram_dir: String,
    /// Directory holding planogram reference images
    pub images_dir: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            planogram_dir: "config/planograms".to_string(),
            images_dir: "config/images".to_string(),
        }
    }
}

/// Load settings from a TOML file
pub fn load_settings(path: &Path) -> Result<EngineSettings> {
    let content = std::fs::read_to_string(path)?;
    let settings: EngineSettings = toml::from_str(&content)?;
    Ok(settings)
}

/// Save settings to a TOML file
pub fn save_settings(settings: &EngineSettings, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}
