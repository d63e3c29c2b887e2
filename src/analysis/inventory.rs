//! Inventory and availability classification
//!
//! Per section and per expected item type, reconciles expected counts against
//! what was detected in place and what was found elsewhere, producing exactly
//! one availability status per (section, type) pair.

use serde::{Deserialize, Serialize};

use super::misplacement::MisplacedItem;
use crate::detect::DetectedItem;
use crate::planogram::{PlanogramConfig, PlanogramSection};

/// Stock health of one item type in one section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    /// No units of this type expected here
    NotExpected,
    /// Nothing detected anywhere
    SoldOut,
    /// All available units sit outside this section
    MisplacedOnly,
    /// Short in place, but misplaced units cover the expectation
    PartiallyMisplaced,
    /// Half or less of the visible expectation on the shelf
    LowStock,
    Available,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AvailabilityStatus::NotExpected => "Not Expected",
            AvailabilityStatus::SoldOut => "Sold Out",
            AvailabilityStatus::MisplacedOnly => "Misplaced Only",
            AvailabilityStatus::PartiallyMisplaced => "Partially Misplaced",
            AvailabilityStatus::LowStock => "Low Stock",
            AvailabilityStatus::Available => "Available",
        };
        write!(f, "{}", label)
    }
}

/// Counts and status for one item type within one section
#[derive(Debug, Clone, Serialize)]
pub struct ItemBreakdown {
    /// Item class name
    pub item_type: String,
    /// Units of this type this section should hold
    pub expected: u32,
    /// Units a camera can realistically see
    pub expected_visible: u32,
    /// Units detected inside this section
    pub detected_in_section: u32,
    /// Units that belong here but were found elsewhere or nowhere
    pub found_elsewhere: u32,
    /// Detected plus found elsewhere
    pub total_available: u32,
    /// Units missing against the expectation
    pub shortage: u32,
    /// Units beyond the expectation
    pub surplus: u32,
    /// Availability classification
    pub status: AvailabilityStatus,
}

/// Inventory reconciliation for one section
#[derive(Debug, Clone, Serialize)]
pub struct DetailedInventoryStatus {
    pub section_id: String,
    pub section_name: String,
    /// One row per item type, expected types first in declaration order
    pub breakdown: Vec<ItemBreakdown>,
}

impl DetailedInventoryStatus {
    /// Sum of expected units across item types
    pub fn total_expected(&self) -> u32 {
        self.breakdown.iter().map(|b| b.expected).sum()
    }

    /// Sum of units detected in this section
    pub fn total_detected(&self) -> u32 {
        self.breakdown.iter().map(|b| b.detected_in_section).sum()
    }

    /// Sum of units that belong here but sit elsewhere
    pub fn total_misplaced(&self) -> u32 {
        self.breakdown.iter().map(|b| b.found_elsewhere).sum()
    }
}

/// Split a section total evenly across `n` item types.
///
/// Integer division, with the remainder assigned one unit each to the first
/// types in declaration order, so the per-type counts always sum back to the
/// section total.
pub fn distribute_expected(total: u32, n: usize) -> Vec<u32> {
    if n == 0 {
        return Vec::new();
    }
    let n32 = n as u32;
    let base = total / n32;
    let remainder = (total % n32) as usize;

    (0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Classify one (section, item type) cell.
///
/// Conditions are evaluated strictly in this order; the first match wins, so
/// every cell receives exactly one status.
pub fn classify(
    expected: u32,
    expected_visible: u32,
    detected: u32,
    misplaced: u32,
) -> AvailabilityStatus {
    let available_total = detected + misplaced;

    if expected == 0 {
        AvailabilityStatus::NotExpected
    } else if available_total == 0 {
        AvailabilityStatus::SoldOut
    } else if detected == 0 && misplaced > 0 {
        AvailabilityStatus::MisplacedOnly
    } else if detected < expected && available_total >= expected {
        AvailabilityStatus::PartiallyMisplaced
    } else if detected as f32 <= expected_visible as f32 * 0.5 && misplaced == 0 {
        AvailabilityStatus::LowStock
    } else {
        AvailabilityStatus::Available
    }
}

/// Build the per-section inventory reconciliation.
///
/// Each detected item counts toward exactly one (section, type) cell via its
/// assigned section; each misplaced item counts toward the cell of the
/// section it belongs in.
pub fn build_inventory(
    config: &PlanogramConfig,
    items: &[DetectedItem],
    misplaced: &[MisplacedItem],
) -> Vec<DetailedInventoryStatus> {
    config
        .sections
        .iter()
        .map(|section| section_inventory(section, items, misplaced))
        .collect()
}

fn section_inventory(
    section: &PlanogramSection,
    items: &[DetectedItem],
    misplaced: &[MisplacedItem],
) -> DetailedInventoryStatus {
    let expected_split = distribute_expected(section.expected_count, section.expected_items.len());
    let visible_split = distribute_expected(section.visible_count(), section.expected_items.len());

    let detected_of = |item_type: &str| -> u32 {
        items
            .iter()
            .filter(|i| {
                i.class_name == item_type && i.section_id.as_deref() == Some(&section.section_id)
            })
            .count() as u32
    };
    let misplaced_of = |item_type: &str| -> u32 {
        misplaced
            .iter()
            .filter(|m| m.item.class_name == item_type && m.expected_section == section.section_id)
            .count() as u32
    };

    let mut breakdown: Vec<ItemBreakdown> = section
        .expected_items
        .iter()
        .zip(expected_split.iter().zip(visible_split.iter()))
        .map(|(item_type, (&expected, &expected_visible))| {
            let detected = detected_of(item_type);
            let found_elsewhere = misplaced_of(item_type);
            let total_available = detected + found_elsewhere;
            ItemBreakdown {
                item_type: item_type.clone(),
                expected,
                expected_visible,
                detected_in_section: detected,
                found_elsewhere,
                total_available,
                shortage: expected.saturating_sub(total_available),
                surplus: total_available.saturating_sub(expected),
                status: classify(expected, expected_visible, detected, found_elsewhere),
            }
        })
        .collect();

    // Types detected inside the section that the planogram never expected
    // there still show up, with a zero expectation.
    let mut stray_types: Vec<&str> = items
        .iter()
        .filter(|i| {
            i.section_id.as_deref() == Some(&section.section_id)
                && !section.expected_items.iter().any(|e| e == &i.class_name)
        })
        .map(|i| i.class_name.as_str())
        .collect();
    stray_types.sort_unstable();
    stray_types.dedup();

    for item_type in stray_types {
        let detected = detected_of(item_type);
        breakdown.push(ItemBreakdown {
            item_type: item_type.to_string(),
            expected: 0,
            expected_visible: 0,
            detected_in_section: detected,
            found_elsewhere: 0,
            total_available: detected,
            shortage: 0,
            surplus: detected,
            status: AvailabilityStatus::NotExpected,
        });
    }

    DetailedInventoryStatus {
        section_id: section.section_id.clone(),
        section_name: section.name.clone(),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::planogram::SectionPriority;

    fn section(id: &str, items: &[&str], count: u32, visible: Option<u32>) -> PlanogramSection {
        PlanogramSection {
            section_id: id.to_string(),
            name: format!("{} shelf", id),
            expected_items: items.iter().map(|s| s.to_string()).collect(),
            expected_count: count,
            expected_visible_count: visible,
            region: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            priority: SectionPriority::default(),
        }
    }

    fn item(class_name: &str, section_id: Option<&str>) -> DetectedItem {
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
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

    fn misplaced_item(class_name: &str, expected_section: &str) -> MisplacedItem {
        MisplacedItem {
            item: item(class_name, None),
            expected_section: expected_section.to_string(),
            actual_section: None,
            distance: 42.0,
        }
    }

    #[test]
    fn test_distribution_sums_to_total() {
        for total in 0..30u32 {
            for n in 1..6usize {
                let split = distribute_expected(total, n);
                assert_eq!(split.len(), n);
                assert_eq!(split.iter().sum::<u32>(), total, "total={} n={}", total, n);
            }
        }
    }

    #[test]
    fn test_distribution_remainder_to_first_types() {
        assert_eq!(distribute_expected(10, 3), vec![4, 3, 3]);
        assert_eq!(distribute_expected(7, 2), vec![4, 3]);
        assert_eq!(distribute_expected(6, 3), vec![2, 2, 2]);
        assert_eq!(distribute_expected(2, 4), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_classify_priority_order() {
        use AvailabilityStatus::*;
        assert_eq!(classify(0, 0, 3, 0), NotExpected);
        assert_eq!(classify(5, 5, 0, 0), SoldOut);
        assert_eq!(classify(5, 5, 0, 2), MisplacedOnly);
        assert_eq!(classify(5, 5, 3, 2), PartiallyMisplaced);
        assert_eq!(classify(10, 10, 2, 0), LowStock);
        assert_eq!(classify(10, 10, 6, 0), Available);
    }

    #[test]
    fn test_classify_low_stock_uses_visible_count() {
        // 3 detected of 10 expected, but only 4 visible: 3 > 4*0.5, not low
        assert_eq!(classify(10, 4, 3, 0), AvailabilityStatus::Available);
        // 2 <= 4*0.5 is low
        assert_eq!(classify(10, 4, 2, 0), AvailabilityStatus::LowStock);
    }

    #[test]
    fn test_classify_low_stock_requires_no_misplaced() {
        // 2 of 10 in place, 1 more elsewhere: available_total < expected so
        // not partially misplaced, and misplaced > 0 blocks low stock
        assert_eq!(classify(10, 10, 2, 1), AvailabilityStatus::Available);
    }

    #[test]
    fn test_classify_totality() {
        // Every combination lands on exactly one status without panicking
        for expected in 0..6 {
            for visible in 0..=expected {
                for detected in 0..8 {
                    for misplaced in 0..8 {
                        let _ = classify(expected, visible, detected, misplaced);
                    }
                }
            }
        }
    }

    #[test]
    fn test_section_totals() {
        let mut config = PlanogramConfig::default();
        config
            .add_section(section("S1", &["cereal", "granola"], 10, Some(8)))
            .unwrap();

        let items = vec![
            item("cereal", Some("S1")),
            item("cereal", Some("S1")),
            item("granola", Some("S1")),
        ];
        let misplaced = vec![misplaced_item("granola", "S1")];

        let inventory = build_inventory(&config, &items, &misplaced);
        assert_eq!(inventory.len(), 1);
        let status = &inventory[0];
        assert_eq!(status.total_expected(), 10);
        assert_eq!(status.total_detected(), 3);
        assert_eq!(status.total_misplaced(), 1);

        let cereal = &status.breakdown[0];
        assert_eq!(cereal.item_type, "cereal");
        assert_eq!(cereal.expected, 5);
        assert_eq!(cereal.expected_visible, 4);
        assert_eq!(cereal.detected_in_section, 2);
        assert_eq!(cereal.shortage, 3);
    }

    #[test]
    fn test_misplaced_only_scenario() {
        // One soda_can found outside every governing section: BEVERAGES
        // reports it as Misplaced Only
        let mut config = PlanogramConfig::default();
        config
            .add_section(section("BEVERAGES", &["soda_can"], 4, None))
            .unwrap();

        let items = vec![item("soda_can", None)];
        let misplaced = vec![misplaced_item("soda_can", "BEVERAGES")];

        let inventory = build_inventory(&config, &items, &misplaced);
        let row = &inventory[0].breakdown[0];
        assert_eq!(row.detected_in_section, 0);
        assert_eq!(row.found_elsewhere, 1);
        assert_eq!(row.status, AvailabilityStatus::MisplacedOnly);
    }

    #[test]
    fn test_no_detections_everything_sold_out() {
        let mut config = PlanogramConfig::default();
        config.add_section(section("S1", &["cereal"], 10, None)).unwrap();
        config.add_section(section("S2", &["chips", "cookies"], 6, None)).unwrap();

        let inventory = build_inventory(&config, &[], &[]);
        for status in &inventory {
            for row in &status.breakdown {
                assert_eq!(row.status, AvailabilityStatus::SoldOut);
            }
        }
    }

    #[test]
    fn test_available_scenario_from_counts() {
        // 6 detected of 10 expected, visible defaults to 10: 6 > 5 so not
        // low stock, available_total < expected so not partially misplaced
        assert_eq!(classify(10, 10, 6, 0), AvailabilityStatus::Available);
        // 2 of 10 with visible 10 is low stock
        assert_eq!(classify(10, 10, 2, 0), AvailabilityStatus::LowStock);
    }

    #[test]
    fn test_stray_type_reported_not_expected() {
        let mut config = PlanogramConfig::default();
        config.add_section(section("S1", &["cereal"], 4, None)).unwrap();

        let items = vec![item("cereal", Some("S1")), item("umbrella", Some("S1"))];
        let inventory = build_inventory(&config, &items, &[]);

        let rows = &inventory[0].breakdown;
        assert_eq!(rows.len(), 2);
        let stray = rows.iter().find(|r| r.item_type == "umbrella").unwrap();
        assert_eq!(stray.status, AvailabilityStatus::NotExpected);
        assert_eq!(stray.surplus, 1);
    }

    #[test]
    fn test_no_double_counting_across_sections() {
        // Two sections both expect cereal; an item assigned to S1 counts
        // only in S1's detected cell
        let mut config = PlanogramConfig::default();
        config.add_section(section("S1", &["cereal"], 4, None)).unwrap();
        config.add_section(section("S2", &["cereal"], 4, None)).unwrap();

        let items = vec![item("cereal", Some("S1"))];
        let inventory = build_inventory(&config, &items, &[]);

        let total_detected: u32 = inventory.iter().map(|s| s.total_detected()).sum();
        assert_eq!(total_detected, 1);
    }
}
