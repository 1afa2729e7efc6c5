//! # B3 Quota Policy
//!
//! B3 machines may not exceed a fixed share of an arcade's active machine
//! total. The allowed maximum is floored, so a lone B3 machine in an arcade
//! of fewer than five machines is always over quota.

use serde::{Deserialize, Serialize};

/// Quota parameters for the B3 tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    /// Maximum B3 share of the active total, in whole percent.
    pub limit_percent: usize,
    /// Fraction of the maximum at which the "approaching" warning fires.
    pub approach_ratio: f64,
}

impl QuotaPolicy {
    /// The regulatory B3 quota: 20% of total, warning at 80% of the maximum.
    pub const B3: QuotaPolicy = QuotaPolicy {
        limit_percent: 20,
        approach_ratio: 0.8,
    };

    /// Maximum B3 machines allowed for `total` active machines.
    ///
    /// Integer floor of `total * limit_percent / 100`, identical to
    /// `floor(total * 0.20)` for the default policy.
    pub fn max_allowed(&self, total: usize) -> usize {
        total * self.limit_percent / 100
    }

    /// Whether `count` is within the maximum for `total`.
    pub fn permits(&self, count: usize, total: usize) -> bool {
        count <= self.max_allowed(total)
    }

    /// Whether `count` has reached the warning threshold for `max_allowed`.
    pub fn is_approaching(&self, count: usize, max_allowed: usize) -> bool {
        count as f64 >= max_allowed as f64 * self.approach_ratio
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::B3
    }
}
