//! # acm-core — Foundational Types for the Arcade Compliance Manager
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! type-system primitives every other crate builds on:
//!
//! 1. **One `MachineCategory` enum.** The regulatory tiers `B3`, `C`, `D` and
//!    the unregulated `OTHER` bucket are defined once. Every `match` on the
//!    category is exhaustive, so adding a tier forces every consumer to
//!    decide how to count it.
//!
//! 2. **Newtype identifiers.** `OrganizationId`, `ArcadeId` and `MachineId`
//!    are distinct types. An arcade id cannot be passed where a machine id
//!    is expected.
//!
//! 3. **Validated serial numbers.** `SerialNumber` trims and length-checks
//!    at construction. Global uniqueness is a storage concern and lives in
//!    the registration layer, not here.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `acm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod category;
pub mod error;
pub mod identity;

pub use category::MachineCategory;
pub use error::{AcmError, ValidationError};
pub use identity::{ArcadeId, MachineId, OrganizationId, SerialNumber, SERIAL_NUMBER_MAX_LEN};
