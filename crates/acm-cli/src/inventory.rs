//! # Inventory Subcommand
//!
//! Validates an onboarding draft the way arcade setup does before any
//! machine is registered: blank rows are skipped, categories must be B3,
//! C or D, serials must be distinct, and the result must meet the quota.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use acm_compliance::{validate_inventory, InventoryEntry, InventoryReport};

use crate::{print_json, OutputFormat, EXIT_COMPLIANT, EXIT_NON_COMPLIANT};

/// Arguments for the `acm inventory` subcommand.
#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Draft inventory (JSON or YAML), bare or under a `machines` key.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the inventory subcommand.
///
/// Returns exit code: 0 when the draft is accepted, 1 when rejected.
pub fn run_inventory(args: &InventoryArgs) -> Result<u8> {
    let entries: Vec<InventoryEntry> = crate::input::load_list(&args.path, "machines")?;

    match validate_inventory(&entries) {
        Ok(report) => {
            match args.format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Text => print!("{}", render(&report)),
            }
            Ok(EXIT_COMPLIANT)
        }
        Err(e) => {
            match args.format {
                OutputFormat::Json => print_json(&serde_json::json!({ "error": e.to_string() }))?,
                OutputFormat::Text => println!("REJECTED: {e}"),
            }
            Ok(EXIT_NON_COMPLIANT)
        }
    }
}

/// Human-readable report of an accepted draft, one line per machine.
pub fn render(report: &InventoryReport) -> String {
    let mut out = format!(
        "ACCEPTED: {} machine(s), {} blank row(s) skipped\n",
        report.accepted.len(),
        report.ignored
    );
    for machine in &report.accepted {
        out.push_str(&format!(
            "  {:<3} {}  {}\n",
            machine.category.as_str(),
            machine.serial_number,
            machine.category.description()
        ));
    }
    out.push_str(&crate::check::render(&report.compliance));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, text: &str) -> u8 {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        run_inventory(&InventoryArgs {
            path,
            format: OutputFormat::Text,
        })
        .unwrap()
    }

    #[test]
    fn accepted_draft_exits_zero() {
        let draft = "machines:\n  - serialNumber: SN-1\n    category: C\n  - serialNumber: ''\n    category: B3\n";
        assert_eq!(run("draft.yaml", draft), EXIT_COMPLIANT);
    }

    #[test]
    fn duplicate_serials_are_rejected() {
        let draft = r#"[{"serialNumber": "SN-1", "category": "C"}, {"serialNumber": "SN-1", "category": "D"}]"#;
        assert_eq!(run("draft.json", draft), EXIT_NON_COMPLIANT);
    }

    #[test]
    fn quota_breach_is_rejected() {
        let draft = r#"[{"serialNumber": "SN-1", "category": "B3"}, {"serialNumber": "SN-2", "category": "C"}]"#;
        assert_eq!(run("draft.json", draft), EXIT_NON_COMPLIANT);
    }

    #[test]
    fn render_describes_each_accepted_machine() {
        let entries: Vec<InventoryEntry> = serde_json::from_str(
            r#"[{"serialNumber": "SN-1", "category": "B3"}, {"serialNumber": "SN-2", "category": "c"},
                {"serialNumber": "SN-3", "category": "C"}, {"serialNumber": "SN-4", "category": "D"},
                {"serialNumber": "SN-5", "category": "D"}, {"serialNumber": " ", "category": "C"}]"#,
        )
        .unwrap();
        let text = render(&validate_inventory(&entries).unwrap());
        assert!(text.starts_with("ACCEPTED: 5 machine(s), 1 blank row(s) skipped"));
        assert!(text.contains("  B3  SN-1  Fixed-odds betting terminal (highest stake and prize)"));
        assert!(text.contains("  C   SN-2  Moderate-stake slot machine"));
        assert!(text.contains("\nCOMPLIANT\n"));
    }
}
