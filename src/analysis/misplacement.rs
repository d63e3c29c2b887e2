//! Misplacement detection
//!
//! An item is misplaced when its class is governed by the planogram but its
//! representative point lies inside none of the sections allowed to contain
//! that class. Membership in any valid section counts as correctly placed,
//! independent of which section the item was assigned to.

use tracing::debug;

use crate::detect::DetectedItem;
use crate::planogram::PlanogramConfig;

/// A detected item found outside every section that may contain its class
#[derive(Debug, Clone)]
pub struct MisplacedItem {
    /// The offending detection
    pub item: DetectedItem,
    /// Nearest section that expects this class, by region-center distance
    pub expected_section: String,
    /// Section the item was actually found in, if any
    pub actual_section: Option<String>,
    /// Distance from the item to the expected section's region center,
    /// informational only
    pub distance: f32,
}

/// Find every misplaced item among the detections.
///
/// Items whose class appears in no section are not governed by the planogram
/// and are skipped entirely.
pub fn find_misplaced(items: &[DetectedItem], config: &PlanogramConfig) -> Vec<MisplacedItem> {
    let mut misplaced = Vec::new();

    for item in items {
        let expected_sections = config.sections_for_item(&item.class_name);
        if expected_sections.is_empty() {
            continue;
        }

        let center = item.center();
        // Inside any section that expects this class means correctly placed
        if expected_sections.iter().any(|s| s.region.contains(center)) {
            continue;
        }

        // Report the nearest valid section as where the item belongs
        let (closest, distance) = expected_sections
            .iter()
            .map(|s| (s, center.distance_to(s.region.center())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .expect("expected_sections is non-empty");

        debug!(
            "Misplaced {}: in {:?}, belongs in {} ({:.1}px away)",
            item.class_name, item.section_id, closest.section_id, distance
        );

        misplaced.push(MisplacedItem {
            item: item.clone(),
            expected_section: closest.section_id.clone(),
            actual_section: item.section_id.clone(),
            distance,
        });
    }

    misplaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::planogram::{PlanogramSection, SectionPriority};

    fn section(id: &str, items: &[&str], region: BoundingBox) -> PlanogramSection {
        PlanogramSection {
            section_id: id.to_string(),
            name: id.to_string(),
            expected_items: items.iter().map(|s| s.to_string()).collect(),
            expected_count: 5,
            expected_visible_count: None,
            region,
            priority: SectionPriority::default(),
        }
    }

    fn item(class_name: &str, bbox: BoundingBox, section_id: Option<&str>) -> DetectedItem {
        DetectedItem {
            class_id: 0,
            class_name: class_name.to_string(),
            confidence: 0.9,
            bbox,
            original_bbox: bbox,
            polygon: None,
            original_polygon: None,
            mask: None,
            section_id: section_id.map(|s| s.to_string()),
        }
    }

    fn two_cereal_sections() -> PlanogramConfig {
        let mut config = PlanogramConfig::default();
        config
            .add_section(section("S1", &["cereal"], BoundingBox::new(0.0, 0.0, 100.0, 100.0)))
            .unwrap();
        config
            .add_section(section("S2", &["cereal"], BoundingBox::new(200.0, 0.0, 300.0, 100.0)))
            .unwrap();
        config
    }

    #[test]
    fn test_item_in_valid_section_not_misplaced() {
        let config = two_cereal_sections();
        let items = vec![item("cereal", BoundingBox::new(10.0, 10.0, 30.0, 30.0), Some("S1"))];
        assert!(find_misplaced(&items, &config).is_empty());
    }

    #[test]
    fn test_item_in_second_valid_section_not_misplaced() {
        // Set membership, not nearest section: any valid section is correct
        let config = two_cereal_sections();
        let items = vec![item("cereal", BoundingBox::new(240.0, 40.0, 260.0, 60.0), Some("S2"))];
        assert!(find_misplaced(&items, &config).is_empty());
    }

    #[test]
    fn test_item_outside_all_valid_sections_is_misplaced() {
        let config = two_cereal_sections();
        // Center (145, 50): outside both sections, 95px from S1's center
        // (50, 50) and 105px from S2's (250, 50)
        let items = vec![item("cereal", BoundingBox::new(140.0, 40.0, 150.0, 60.0), None)];

        let misplaced = find_misplaced(&items, &config);
        assert_eq!(misplaced.len(), 1);
        assert_eq!(misplaced[0].expected_section, "S1");
        assert_eq!(misplaced[0].actual_section, None);
        assert!((misplaced[0].distance - 95.0).abs() < 1.0);
    }

    #[test]
    fn test_nearest_section_tie_break() {
        let config = two_cereal_sections();
        // Center (290, 150): below S2, much closer to S2's center
        let items = vec![item("cereal", BoundingBox::new(280.0, 140.0, 300.0, 160.0), None)];

        let misplaced = find_misplaced(&items, &config);
        assert_eq!(misplaced.len(), 1);
        assert_eq!(misplaced[0].expected_section, "S2");
    }

    #[test]
    fn test_ungoverned_class_skipped() {
        let config = two_cereal_sections();
        let items = vec![item("umbrella", BoundingBox::new(500.0, 500.0, 520.0, 520.0), None)];
        assert!(find_misplaced(&items, &config).is_empty());
    }

    #[test]
    fn test_item_in_wrong_section_reports_actual() {
        let mut config = two_cereal_sections();
        config
            .add_section(section("SNACKS", &["chips"], BoundingBox::new(0.0, 200.0, 100.0, 300.0)))
            .unwrap();

        // A cereal sitting in the snacks section
        let items = vec![item("cereal", BoundingBox::new(40.0, 240.0, 60.0, 260.0), Some("SNACKS"))];

        let misplaced = find_misplaced(&items, &config);
        assert_eq!(misplaced.len(), 1);
        assert_eq!(misplaced[0].expected_section, "S1");
        assert_eq!(misplaced[0].actual_section.as_deref(), Some("SNACKS"));
    }
}
