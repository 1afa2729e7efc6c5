//! # Onboarding Inventory Validation
//!
//! Checks a draft machine list entered while setting up a new arcade before
//! anything is persisted. Draft rows without a serial number are treated as
//! unfilled and skipped. The remaining rows must carry a regulated category
//! and distinct serials, and the resulting arcade must satisfy the B3 quota.

use std::collections::HashSet;

use acm_core::{MachineCategory, SerialNumber, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::{evaluate_arcade_compliance, ComplianceCheckResult};

/// One row of an onboarding draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    #[serde(default)]
    pub serial_number: String,
    pub category: MachineCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<NaiveDate>,
}

impl InventoryEntry {
    /// A bare entry with only serial and category.
    pub fn new(serial_number: impl Into<String>, category: MachineCategory) -> Self {
        Self {
            serial_number: serial_number.into(),
            category,
            manufacturer: None,
            model: None,
            location: None,
            install_date: None,
        }
    }

    fn is_blank(&self) -> bool {
        self.serial_number.trim().is_empty()
    }
}

/// A draft row that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMachine {
    pub serial_number: SerialNumber,
    pub category: MachineCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<NaiveDate>,
}

/// Outcome of a successful inventory validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub compliance: ComplianceCheckResult,
    pub accepted: Vec<InventoryMachine>,
    /// Number of blank draft rows skipped.
    pub ignored: usize,
}

/// Reasons an onboarding draft is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InventoryError {
    #[error("Please add at least one machine with a serial number.")]
    Empty,

    #[error("invalid serial number in row {row}: {source}")]
    InvalidSerial {
        row: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Category must be B3, C, or D (serial {0})")]
    UnregulatedCategory(String),

    #[error("Duplicate serial number in inventory: {0}")]
    DuplicateSerial(String),

    #[error("Compliance issues detected: {}", .0.join(", "))]
    NonCompliant(Vec<String>),
}

/// Validate an onboarding draft.
///
/// Row numbers in errors are 1-based positions in the original draft,
/// including skipped blank rows.
pub fn validate_inventory(entries: &[InventoryEntry]) -> Result<InventoryReport, InventoryError> {
    let filled: Vec<(usize, &InventoryEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_blank())
        .collect();

    if filled.is_empty() {
        return Err(InventoryError::Empty);
    }

    let mut seen = HashSet::with_capacity(filled.len());
    let mut accepted = Vec::with_capacity(filled.len());

    for (index, entry) in &filled {
        let serial = SerialNumber::new(entry.serial_number.as_str()).map_err(|source| {
            InventoryError::InvalidSerial {
                row: index + 1,
                source,
            }
        })?;
        if !entry.category.is_regulated() {
            return Err(InventoryError::UnregulatedCategory(serial.to_string()));
        }
        if !seen.insert(serial.clone()) {
            return Err(InventoryError::DuplicateSerial(serial.to_string()));
        }
        accepted.push(InventoryMachine {
            serial_number: serial,
            category: entry.category,
            manufacturer: entry.manufacturer.clone(),
            model: entry.model.clone(),
            location: entry.location.clone(),
            install_date: entry.install_date,
        });
    }

    let compliance = evaluate_arcade_compliance(accepted.iter().map(|m| m.category));
    if !compliance.is_compliant {
        return Err(InventoryError::NonCompliant(compliance.issues));
    }

    Ok(InventoryReport {
        compliance,
        accepted,
        ignored: entries.len() - filled.len(),
    })
}
