//! Task generation
//!
//! Turns misplacement and availability findings into a typed action list.
//! Output order is insertion order: relocations first, then restocks, then
//! checks, then removals. Priority sorting is left to whoever presents the
//! list.

use serde::{Deserialize, Serialize};

use super::inventory::{AvailabilityStatus, DetailedInventoryStatus};
use super::misplacement::MisplacedItem;
use crate::planogram::SectionPriority;

/// Kind of remediation work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Restock,
    Relocate,
    Remove,
    Check,
}

/// One unit of remediation work for store staff
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Stable id within the run, e.g. `RELOCATE_001`
    pub task_id: String,
    pub description: String,
    /// Section the work targets
    pub section_id: String,
    pub priority: SectionPriority,
    pub task_type: TaskType,
    /// Estimated effort in minutes
    pub estimated_minutes: u32,
}

/// Generate the remediation task list for one analysis run.
///
/// Tasks are not deduplicated or merged; a (section, type) cell with two
/// problem conditions yields two tasks. Cannot fail on well-formed input.
pub fn generate_tasks(
    misplaced: &[MisplacedItem],
    inventory: &[DetailedInventoryStatus],
) -> Vec<Task> {
    let mut tasks = Vec::new();
    let mut counter = 1u32;

    for m in misplaced {
        tasks.push(Task {
            task_id: format!("RELOCATE_{:03}", counter),
            description: format!(
                "Move {} from {} to {}",
                m.item.class_name,
                m.actual_section.as_deref().unwrap_or("unknown"),
                m.expected_section
            ),
            section_id: m.expected_section.clone(),
            priority: SectionPriority::Medium,
            task_type: TaskType::Relocate,
            estimated_minutes: 5,
        });
        counter += 1;
    }

    for status in inventory {
        for row in &status.breakdown {
            match row.status {
                AvailabilityStatus::SoldOut => {
                    tasks.push(Task {
                        task_id: format!("RESTOCK_{:03}", counter),
                        description: format!(
                            "Restock {} in {} - currently sold out",
                            row.item_type, status.section_name
                        ),
                        section_id: status.section_id.clone(),
                        priority: SectionPriority::High,
                        task_type: TaskType::Restock,
                        estimated_minutes: 10,
                    });
                    counter += 1;
                }
                AvailabilityStatus::LowStock => {
                    tasks.push(Task {
                        task_id: format!("RESTOCK_{:03}", counter),
                        description: format!(
                            "Restock {} in {} - low inventory ({}/{})",
                            row.item_type,
                            status.section_name,
                            row.detected_in_section,
                            row.expected
                        ),
                        section_id: status.section_id.clone(),
                        priority: SectionPriority::Medium,
                        task_type: TaskType::Restock,
                        estimated_minutes: 8,
                    });
                    counter += 1;
                }
                _ => {}
            }
        }
    }

    for status in inventory {
        for row in &status.breakdown {
            if matches!(
                row.status,
                AvailabilityStatus::MisplacedOnly | AvailabilityStatus::PartiallyMisplaced
            ) {
                tasks.push(Task {
                    task_id: format!("CHECK_{:03}", counter),
                    description: format!(
                        "Check {} placement in {} - {} unit(s) found outside the section",
                        row.item_type, status.section_name, row.found_elsewhere
                    ),
                    section_id: status.section_id.clone(),
                    priority: SectionPriority::Medium,
                    task_type: TaskType::Check,
                    estimated_minutes: 7,
                });
                counter += 1;
            }
        }
    }

    for status in inventory {
        for row in &status.breakdown {
            if row.surplus > 0 {
                tasks.push(Task {
                    task_id: format!("REMOVE_{:03}", counter),
                    description: format!(
                        "Remove {} excess {} from {}",
                        row.surplus, row.item_type, status.section_name
                    ),
                    section_id: status.section_id.clone(),
                    priority: SectionPriority::Low,
                    task_type: TaskType::Remove,
                    estimated_minutes: 5,
                });
                counter += 1;
            }
        }
    }

    tasks
}
