//! # acm-compliance — Arcade Machine Compliance Engine
//!
//! Evaluates the regulatory machine mix of arcades:
//!
//! - **Tally** (`tally.rs`): counts active machines by category. `OTHER`
//!   and unclassified machines count toward the total only.
//!
//! - **Quota** (`quota.rs`): the B3 quota policy. B3 machines may not
//!   exceed 20% of the active machine total, floored.
//!
//! - **Evaluation** (`evaluation.rs`): the single-arcade evaluator producing
//!   a [`ComplianceCheckResult`] with issues, warnings and a breakdown.
//!
//! - **Overview** (`overview.rs`): organization-wide aggregation of
//!   per-arcade results into a summary.
//!
//! - **Inventory** (`inventory.rs`): pre-submission validation of an
//!   onboarding machine inventory draft.
//!
//! - **Lookup** (`lookup.rs`): traits for the persistence collaborators that
//!   supply machine and arcade snapshots.
//!
//! ## Evaluation model
//!
//! Compliance is never stored. Every read recomputes from the current
//! machine snapshot, so there is no cached verdict to invalidate. The
//! evaluator is pure: identical input yields identical output, it performs
//! no I/O and holds no state, and it is safe to call from any thread.
//!
//! ## Rounding
//!
//! Two rounding rules coexist and must not be unified:
//!
//! | Value | Rule |
//! |-------|------|
//! | `max_b3_allowed` | floor of 20% of total |
//! | `compliance_percentage` | round to nearest integer |
//! | `b3_percentage` | round to one decimal, display only |

pub mod evaluation;
pub mod inventory;
pub mod lookup;
pub mod machine;
pub mod overview;
pub mod quota;
pub mod tally;

pub use evaluation::{
    evaluate_arcade_compliance, evaluate_tally, ComplianceCheckResult, MachineBreakdown,
};
pub use inventory::{
    validate_inventory, InventoryEntry, InventoryError, InventoryMachine, InventoryReport,
};
pub use lookup::{check_arcade, organization_overview, ArcadeLookup, LookupError, MachineLookup};
pub use machine::{MachineSnapshot, MachineView};
pub use overview::{
    evaluate_organization_compliance, ArcadeComplianceDetail, ArcadeRef, ArcadeSnapshot,
    ComplianceSummary, OrganizationComplianceOverview,
};
pub use quota::QuotaPolicy;
pub use tally::MachineTally;
