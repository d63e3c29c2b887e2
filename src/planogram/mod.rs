//! Planogram configuration
//!
//! The declarative model of a shelf layout: named sections, each with a
//! spatial region in reference coordinates, the item types it should hold,
//! expected counts and a priority. Documents are stored as JSON.

pub mod settings;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::geometry::{BoundingBox, Point};

/// Errors from planogram document handling
#[derive(Debug, Error)]
pub enum PlanogramError {
    #[error("section ID '{0}' already exists")]
    DuplicateSection(String),
    #[error("failed to read planogram document: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid planogram document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stocking priority of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for SectionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionPriority::High => write!(f, "High"),
            SectionPriority::Medium => write!(f, "Medium"),
            SectionPriority::Low => write!(f, "Low"),
        }
    }
}

/// One named shelf section with expected contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanogramSection {
    /// Unique identifier within a configuration
    pub section_id: String,
    /// Human-readable name
    pub name: String,
    /// Item class names expected in this section
    pub expected_items: Vec<String>,
    /// Total physical capacity, including occluded items
    pub expected_count: u32,
    /// How many items a camera can realistically see; defaults to
    /// `expected_count` for documents that predate occlusion modeling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_visible_count: Option<u32>,
    /// Section region in reference coordinates
    #[serde(rename = "position")]
    pub region: BoundingBox,
    /// Stocking priority
    #[serde(default)]
    pub priority: SectionPriority,
}

impl PlanogramSection {
    /// Expected visible count, falling back to the full expected count
    pub fn visible_count(&self) -> u32 {
        self.expected_visible_count.unwrap_or(self.expected_count)
    }
}

/// A full planogram document: ordered sections plus free-form metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanogramConfig {
    /// Free-form document metadata (store id, version, ...)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Path to the canonical planogram reference image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planogram_image_path: Option<String>,
    /// Sections in declaration order
    #[serde(default)]
    pub sections: Vec<PlanogramSection>,
}

impl PlanogramConfig {
    /// Parse a planogram document from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, PlanogramError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a planogram document from a JSON file
    pub fn load(path: &Path) -> Result<Self, PlanogramError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        info!(
            "Loaded planogram document {:?}: {} sections",
            path,
            config.sections.len()
        );
        Ok(config)
    }

    /// Save the document to a JSON file, pretty-printed
    pub fn save(&self, path: &Path) -> Result<(), PlanogramError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add a section, rejecting duplicate IDs
    pub fn add_section(&mut self, section: PlanogramSection) -> Result<(), PlanogramError> {
        if self.sections.iter().any(|s| s.section_id == section.section_id) {
            return Err(PlanogramError::DuplicateSection(section.section_id));
        }
        self.sections.push(section);
        Ok(())
    }

    /// Remove a section by ID. Returns whether a section was removed.
    pub fn remove_section(&mut self, section_id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.section_id != section_id);
        self.sections.len() < before
    }

    /// Look up a section by ID
    pub fn section_by_id(&self, section_id: &str) -> Option<&PlanogramSection> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    /// All sections that list the given item class among their expected items
    pub fn sections_for_item(&self, item_class: &str) -> Vec<&PlanogramSection> {
        self.sections
            .iter()
            .filter(|s| s.expected_items.iter().any(|i| i == item_class))
            .collect()
    }

    /// First declared section whose region contains the point, bounds
    /// inclusive. Overlapping sections resolve to declaration order.
    pub fn find_section_by_position(&self, x: f32, y: f32) -> Option<&PlanogramSection> {
        let point = Point::new(x, y);
        self.sections.iter().find(|s| s.region.contains(point))
    }

    /// Check the document for structural issues.
    ///
    /// Never fails; returns every issue found as a human-readable string.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.sections.is_empty() {
            issues.push("No sections defined in configuration".to_string());
        }

        let mut seen_ids = std::collections::HashSet::new();
        for section in &self.sections {
            if !seen_ids.insert(section.section_id.as_str()) {
                issues.push(format!("Duplicate section ID: {}", section.section_id));
            }

            if section.expected_items.is_empty() {
                issues.push(format!(
                    "Section '{}' has no expected items",
                    section.section_id
                ));
            }

            if section.expected_count == 0 {
                issues.push(format!(
                    "Section '{}' has invalid expected count: 0",
                    section.section_id
                ));
            }

            if section.visible_count() > section.expected_count {
                issues.push(format!(
                    "Section '{}' expects more visible items ({}) than its capacity ({})",
                    section.section_id,
                    section.visible_count(),
                    section.expected_count
                ));
            }

            if section.region.width() <= 0.0 || section.region.height() <= 0.0 {
                issues.push(format!(
                    "Section '{}' has a degenerate region",
                    section.section_id
                ));
            }
        }

        // Overlapping regions make point containment order-dependent
        for (i, a) in self.sections.iter().enumerate() {
            for b in &self.sections[i + 1..] {
                if a.section_id != b.section_id && a.region.overlaps(&b.region) {
                    issues.push(format!(
                        "Sections '{}' and '{}' have overlapping regions; containment resolves to declaration order",
                        a.section_id, b.section_id
                    ));
                }
            }
        }

        issues
    }

    /// A small sample document for demos and tests
    pub fn sample() -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert("name".into(), "Sample Grocery Store Layout".into());
        metadata.insert("store_id".into(), "STORE_001".into());
        metadata.insert("version".into(), "1.0".into());

        let mut config = Self {
            metadata,
            planogram_image_path: None,
            sections: Vec::new(),
        };

        let sections = [
            PlanogramSection {
                section_id: "CEREALS_TOP".into(),
                name: "Cereals - Top Shelf".into(),
                expected_items: vec!["cereal_box".into(), "granola".into()],
                expected_count: 8,
                expected_visible_count: Some(6),
                region: BoundingBox::new(0.0, 0.0, 300.0, 100.0),
                priority: SectionPriority::Medium,
            },
            PlanogramSection {
                section_id: "CEREALS_MIDDLE".into(),
                name: "Cereals - Middle Shelf".into(),
                expected_items: vec!["cereal_box".into()],
                expected_count: 12,
                expected_visible_count: Some(10),
                region: BoundingBox::new(0.0, 100.0, 300.0, 200.0),
                priority: SectionPriority::High,
            },
            PlanogramSection {
                section_id: "SNACKS_TOP".into(),
                name: "Snacks - Top Shelf".into(),
                expected_items: vec!["chips".into(), "cookies".into()],
                expected_count: 6,
                expected_visible_count: Some(5),
                region: BoundingBox::new(300.0, 0.0, 600.0, 100.0),
                priority: SectionPriority::Low,
            },
            PlanogramSection {
                section_id: "BEVERAGES".into(),
                name: "Beverages Section".into(),
                expected_items: vec!["bottle".into(), "can".into()],
                expected_count: 15,
                expected_visible_count: Some(12),
                region: BoundingBox::new(300.0, 100.0, 600.0, 200.0),
                priority: SectionPriority::High,
            },
        ];

        for section in sections {
            config
                .add_section(section)
                .expect("sample section ids are unique");
        }

        config
    }
}
