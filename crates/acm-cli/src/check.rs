//! # Check Subcommand
//!
//! Evaluates the B3 quota over one arcade's machine list. Entries need
//! only a `category` (unknown tags count as OTHER) and an optional
//! `isActive` flag.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use acm_compliance::{evaluate_arcade_compliance, ComplianceCheckResult, MachineSnapshot};

use crate::{print_json, OutputFormat, EXIT_COMPLIANT, EXIT_NON_COMPLIANT};

/// Arguments for the `acm check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Machine list (JSON or YAML), bare or under a `machines` key.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when compliant, 1 when the B3 quota is exceeded.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let machines: Vec<MachineSnapshot> = crate::input::load_list(&args.path, "machines")?;
    tracing::debug!(path = %args.path.display(), machines = machines.len(), "loaded machine list");

    let result = evaluate_arcade_compliance(&machines);
    match args.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => print!("{}", render(&result)),
    }

    Ok(if result.is_compliant {
        EXIT_COMPLIANT
    } else {
        EXIT_NON_COMPLIANT
    })
}

/// Human-readable report of one verdict.
pub fn render(result: &ComplianceCheckResult) -> String {
    let b = &result.machine_breakdown;
    let mut out = format!(
        "{}\n  machines: {} (B3 {}, C {}, D {})\n  B3 share: {:.1}% (max allowed {})\n",
        if result.is_compliant {
            "COMPLIANT"
        } else {
            "NON-COMPLIANT"
        },
        b.total,
        b.b3_count,
        b.c_count,
        b.d_count,
        b.b3_percentage,
        b.max_b3_allowed,
    );
    for issue in &result.issues {
        out.push_str(&format!("  ISSUE: {issue}\n"));
    }
    for warning in &result.warnings {
        out.push_str(&format!("  WARN: {warning}\n"));
    }
    out
}
