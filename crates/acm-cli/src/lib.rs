//! # acm-cli — Offline Compliance Tool
//!
//! Provides the `acm` command-line interface over the `acm-compliance`
//! engine. Input files are JSON, or YAML when the extension is `.yaml` /
//! `.yml`.
//!
//! ## Subcommands
//!
//! - `acm check`: B3 quota check of one arcade's machine list.
//! - `acm overview`: Organization-wide summary over several arcades.
//! - `acm inventory`: Validate an onboarding machine inventory draft.
//!
//! ```bash
//! acm check pier-arcade.yaml
//! acm overview seaside-leisure.json --format json
//! acm inventory draft.yaml
//! ```
//!
//! ## Exit codes
//!
//! `0` compliant, `1` non-compliant or rejected, `2` unreadable input.

pub mod check;
pub mod input;
pub mod inventory;
pub mod overview;

use clap::ValueEnum;

/// Report rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Pretty-printed JSON of the underlying result.
    Json,
}

/// Exit code for a compliant result.
pub const EXIT_COMPLIANT: u8 = 0;
/// Exit code for a non-compliant result or rejected draft.
pub const EXIT_NON_COMPLIANT: u8 = 1;
/// Exit code for unreadable or malformed input.
pub const EXIT_ERROR: u8 = 2;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
