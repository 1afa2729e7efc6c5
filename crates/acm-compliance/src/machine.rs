//! # Machine View
//!
//! The evaluator only needs two facts about a machine: its category and
//! whether it is active. [`MachineView`] is the seam through which any
//! machine record (API store records, database rows, CLI input) is counted.

use acm_core::MachineCategory;
use serde::{Deserialize, Deserializer, Serialize};

/// The minimal view of a machine required for compliance counting.
pub trait MachineView {
    /// Regulatory category. Unclassified machines report
    /// [`MachineCategory::Other`].
    fn category(&self) -> MachineCategory;

    /// Whether the machine counts toward compliance.
    fn is_active(&self) -> bool {
        true
    }
}

impl MachineView for MachineCategory {
    fn category(&self) -> MachineCategory {
        *self
    }
}

impl<T: MachineView + ?Sized> MachineView for &T {
    fn category(&self) -> MachineCategory {
        (**self).category()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// A plain machine snapshot: category plus active flag.
///
/// Deserialization is lenient about the category: a missing, null or
/// unrecognised tag becomes [`MachineCategory::Other`] so the machine still
/// counts toward the total. A missing active flag defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSnapshot {
    #[serde(default = "other_category", deserialize_with = "lenient_category")]
    pub category: MachineCategory,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl MachineSnapshot {
    /// An active machine of the given category.
    pub fn active(category: MachineCategory) -> Self {
        Self {
            category,
            is_active: true,
        }
    }

    /// An inactive machine of the given category.
    pub fn inactive(category: MachineCategory) -> Self {
        Self {
            category,
            is_active: false,
        }
    }
}

impl MachineView for MachineSnapshot {
    fn category(&self) -> MachineCategory {
        self.category
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

fn other_category() -> MachineCategory {
    MachineCategory::Other
}

fn default_active() -> bool {
    true
}

fn lenient_category<'de, D>(deserializer: D) -> Result<MachineCategory, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(MachineCategory::classify(
        tag.as_ref().and_then(serde_json::Value::as_str),
    ))
}
