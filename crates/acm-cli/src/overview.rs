//! # Overview Subcommand
//!
//! Summarizes compliance across the arcades of one organization file:
//!
//! ```yaml
//! arcades:
//!   - name: Pier Arcade
//!     machines:
//!       - category: B3
//!       - category: C
//!   - name: Harbour Arcade
//!     machines: []
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use acm_compliance::{
    evaluate_organization_compliance, ArcadeSnapshot, OrganizationComplianceOverview,
};

use crate::{print_json, OutputFormat, EXIT_COMPLIANT, EXIT_NON_COMPLIANT};

/// Arguments for the `acm overview` subcommand.
#[derive(Args, Debug)]
pub struct OverviewArgs {
    /// Organization file (JSON or YAML), bare arcade list or under `arcades`.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the overview subcommand.
///
/// Returns exit code: 0 when every arcade is compliant, 1 otherwise.
pub fn run_overview(args: &OverviewArgs) -> Result<u8> {
    let arcades: Vec<ArcadeSnapshot> = crate::input::load_list(&args.path, "arcades")?;
    let overview = evaluate_organization_compliance(&arcades);

    match args.format {
        OutputFormat::Json => print_json(&overview)?,
        OutputFormat::Text => print!("{}", render(&overview)),
    }

    Ok(if overview.summary.arcades_with_issues == 0 {
        EXIT_COMPLIANT
    } else {
        EXIT_NON_COMPLIANT
    })
}

/// Human-readable organization report.
pub fn render(overview: &OrganizationComplianceOverview) -> String {
    let s = &overview.summary;
    let mut out = format!(
        "Arcades: {}/{} compliant ({}%), {} with warnings\n",
        s.compliant_arcades, s.total_arcades, s.compliance_percentage, s.arcades_with_warnings
    );
    for detail in &overview.arcade_details {
        let b = &detail.compliance.machine_breakdown;
        out.push_str(&format!(
            "  {} {}: B3 {}/{} of {} machines\n",
            if detail.compliance.is_compliant {
                "OK  "
            } else {
                "FAIL"
            },
            detail.arcade.name,
            b.b3_count,
            b.max_b3_allowed,
            b.total
        ));
        for issue in &detail.compliance.issues {
            out.push_str(&format!("       {issue}\n"));
        }
    }
    let failing: Vec<&str> = overview
        .non_compliant()
        .map(|detail| detail.arcade.name.as_str())
        .collect();
    if !failing.is_empty() {
        out.push_str(&format!("Non-compliant: {}\n", failing.join(", ")));
    }
    out
}
