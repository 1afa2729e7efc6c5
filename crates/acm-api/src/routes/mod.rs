//! # API Route Modules
//!
//! - `organizations`: operator organizations
//! - `arcades`: arcade setup and listing, with a declared-count compliance
//!   preview
//! - `machines`: the machine registry (add, edit, deactivate, remove); every
//!   mutation answers with the arcade's fresh compliance
//! - `compliance`: single-arcade checks, organization overview, onboarding
//!   inventory validation

pub mod arcades;
pub mod compliance;
pub mod machines;
pub mod organizations;
