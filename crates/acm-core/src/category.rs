//! # Machine Category — Single Source of Truth
//!
//! Defines the [`MachineCategory`] enum: the regulatory tiers a gaming
//! machine can be classified under, plus the catch-all `OTHER` bucket for
//! unregulated devices. This is the ONE definition used across the
//! workspace. Every `match` on it must be exhaustive.
//!
//! ## Counting rule
//!
//! `B3`, `C` and `D` are broken out in compliance breakdowns. `OTHER` is
//! counted toward the arcade total only. Inputs with a missing or
//! unrecognised tag are classified as `OTHER` by [`MachineCategory::classify`]
//! so the total stays correct even when classification is incomplete.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// Regulatory classification of a gaming machine.
///
/// | Tag | Tier | Description |
/// |-----|------|-------------|
/// | `B3` | highest | Fixed-odds betting terminal, highest stake/prize, quota-limited |
/// | `C` | moderate | Moderate-stake slot machine |
/// | `D` | low | Low-stake, low-prize machine |
/// | `OTHER` | none | Unregulated device (crane, redemption); total only |
///
/// Serializes as the uppercase tag. Deserializes through [`FromStr`], so
/// `"c"` and `"C"` are the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum MachineCategory {
    /// Fixed-odds betting terminal. Subject to the B3 quota.
    B3,
    /// Moderate-stake slot machine.
    C,
    /// Low-stake, low-prize machine.
    D,
    /// Unregulated device. Counted in the total, never broken out.
    #[serde(rename = "OTHER")]
    Other,
}

impl MachineCategory {
    /// Returns every category in canonical order.
    pub fn all() -> &'static [MachineCategory] {
        &[Self::B3, Self::C, Self::D, Self::Other]
    }

    /// Returns the categories an operator may register through the
    /// machine inventory (`B3`, `C`, `D`).
    pub fn regulated() -> &'static [MachineCategory] {
        &[Self::B3, Self::C, Self::D]
    }

    /// Returns the wire tag for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::B3 => "B3",
            Self::C => "C",
            Self::D => "D",
            Self::Other => "OTHER",
        }
    }

    /// Whether this category is a regulated gaming tier.
    pub fn is_regulated(&self) -> bool {
        Self::regulated().contains(self)
    }

    /// Human-readable description of the tier.
    pub fn description(&self) -> &'static str {
        match self {
            Self::B3 => "Fixed-odds betting terminal (highest stake and prize)",
            Self::C => "Moderate-stake slot machine",
            Self::D => "Low-stake, low-prize machine",
            Self::Other => "Unregulated device (crane, redemption, amusement)",
        }
    }

    /// Lenient classification for counting.
    ///
    /// Missing or unrecognised tags map to [`MachineCategory::Other`]
    /// instead of failing.
    pub fn classify(tag: Option<&str>) -> Self {
        tag.and_then(|t| t.parse().ok()).unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for MachineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineCategory {
    type Err = ValidationError;

    /// Parse a category tag. Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B3" => Ok(Self::B3),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "OTHER" => Ok(Self::Other),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

impl TryFrom<String> for MachineCategory {
    type Error = ValidationError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}
