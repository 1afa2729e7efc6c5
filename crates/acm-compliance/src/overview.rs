//! # Organization Compliance Overview
//!
//! Runs the single-arcade evaluator over every arcade of an organization and
//! summarizes the results. Each arcade is evaluated independently with no
//! shared state, so callers holding slow snapshot sources may evaluate
//! arcades concurrently and assemble the overview with
//! [`OrganizationComplianceOverview::from_details`].
//!
//! The summary percentage rounds to the nearest integer, unlike the floored
//! B3 maximum. The asymmetry is intentional.

use acm_core::ArcadeId;
use serde::{Deserialize, Serialize};

use crate::evaluation::{evaluate_arcade_compliance, ComplianceCheckResult};
use crate::machine::MachineSnapshot;

/// Identity of an evaluated arcade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcadeRef {
    #[serde(default)]
    pub id: ArcadeId,
    pub name: String,
}

/// One arcade and its current machine snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeSnapshot {
    #[serde(flatten)]
    pub arcade: ArcadeRef,
    #[serde(default, alias = "activeMachines")]
    pub machines: Vec<MachineSnapshot>,
}

/// Per-arcade entry of the overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcadeComplianceDetail {
    pub arcade: ArcadeRef,
    pub compliance: ComplianceCheckResult,
}

/// Organization-level counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub total_arcades: usize,
    pub compliant_arcades: usize,
    pub arcades_with_issues: usize,
    pub arcades_with_warnings: usize,
    /// Share of compliant arcades, rounded to the nearest whole percent.
    pub compliance_percentage: u32,
}

impl ComplianceSummary {
    /// Summarize a set of per-arcade results.
    pub fn from_details(details: &[ArcadeComplianceDetail]) -> Self {
        let total_arcades = details.len();
        let compliant_arcades = details.iter().filter(|d| d.compliance.is_compliant).count();
        let arcades_with_issues = details.iter().filter(|d| d.compliance.has_issues()).count();
        let arcades_with_warnings = details
            .iter()
            .filter(|d| d.compliance.has_warnings())
            .count();
        let compliance_percentage = if total_arcades > 0 {
            (compliant_arcades as f64 / total_arcades as f64 * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_arcades,
            compliant_arcades,
            arcades_with_issues,
            arcades_with_warnings,
            compliance_percentage,
        }
    }
}

/// Compliance overview across an organization's arcades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationComplianceOverview {
    pub summary: ComplianceSummary,
    pub arcade_details: Vec<ArcadeComplianceDetail>,
}

impl OrganizationComplianceOverview {
    /// Assemble an overview from already-evaluated arcades, keeping their order.
    pub fn from_details(arcade_details: Vec<ArcadeComplianceDetail>) -> Self {
        Self {
            summary: ComplianceSummary::from_details(&arcade_details),
            arcade_details,
        }
    }

    /// Details of the arcades that fail the quota.
    pub fn non_compliant(&self) -> impl Iterator<Item = &ArcadeComplianceDetail> {
        self.arcade_details
            .iter()
            .filter(|d| !d.compliance.is_compliant)
    }
}

/// Evaluate every arcade and summarize. Zero arcades yields an all-zero
/// summary, not an error.
pub fn evaluate_organization_compliance(arcades: &[ArcadeSnapshot]) -> OrganizationComplianceOverview {
    let details = arcades
        .iter()
        .map(|snapshot| ArcadeComplianceDetail {
            arcade: snapshot.arcade.clone(),
            compliance: evaluate_arcade_compliance(&snapshot.machines),
        })
        .collect();
    OrganizationComplianceOverview::from_details(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acm_core::MachineCategory;

    fn snapshot(name: &str, b3: usize, c: usize) -> ArcadeSnapshot {
        let mut machines: Vec<MachineSnapshot> = (0..b3)
            .map(|_| MachineSnapshot::active(MachineCategory::B3))
            .collect();
        machines.extend((0..c).map(|_| MachineSnapshot::active(MachineCategory::C)));
        ArcadeSnapshot {
            arcade: ArcadeRef {
                id: ArcadeId::new(),
                name: name.to_string(),
            },
            machines,
        }
    }

    #[test]
    fn empty_organization_is_all_zero() {
        let overview = evaluate_organization_compliance(&[]);
        assert_eq!(overview.summary, ComplianceSummary::default());
        assert!(overview.arcade_details.is_empty());
    }

    #[test]
    fn mixed_arcades_round_percentage() {
        let arcades = vec![
            snapshot("Pier Amusements", 1, 9),
            snapshot("Seafront Arcade", 0, 12),
            snapshot("High Street Games", 3, 7),
        ];
        let overview = evaluate_organization_compliance(&arcades);
        let s = overview.summary;
        assert_eq!(s.total_arcades, 3);
        assert_eq!(s.compliant_arcades, 2);
        assert_eq!(s.arcades_with_issues, 1);
        assert_eq!(s.compliance_percentage, 67);
        assert_eq!(overview.non_compliant().count(), 1);
        assert_eq!(
            overview.non_compliant().next().map(|d| d.arcade.name.as_str()),
            Some("High Street Games")
        );
    }

    #[test]
    fn details_preserve_order_and_identity() {
        let arcades = vec![snapshot("B", 0, 5), snapshot("A", 0, 5), snapshot("C", 0, 5)];
        let overview = evaluate_organization_compliance(&arcades);
        let ids: Vec<ArcadeId> = overview.arcade_details.iter().map(|d| d.arcade.id).collect();
        let expected: Vec<ArcadeId> = arcades.iter().map(|a| a.arcade.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn warnings_counted_separately_from_issues() {
        let arcades = vec![
            // at limit: warning, no issue
            snapshot("At limit", 2, 8),
            // empty: warning, no issue
            snapshot("Empty", 0, 0),
            // over: issue and warning
            snapshot("Over", 1, 0),
        ];
        let s = evaluate_organization_compliance(&arcades).summary;
        assert_eq!(s.arcades_with_warnings, 3);
        assert_eq!(s.arcades_with_issues, 1);
        assert_eq!(s.compliant_arcades, 2);
    }

    #[test]
    fn percentage_rounds_half_up() {
        // 1 of 8 compliant = 12.5% -> 13
        let mut arcades = vec![snapshot("ok", 0, 10)];
        arcades.extend((0..7).map(|i| snapshot(&format!("bad-{i}"), 1, 0)));
        let s = evaluate_organization_compliance(&arcades).summary;
        assert_eq!(s.total_arcades, 8);
        assert_eq!(s.compliance_percentage, 13);
    }

    #[test]
    fn snapshot_deserializes_from_camel_case() {
        let json = r#"{
            "id": "7a4b6f1e-2c3d-4e5f-8a9b-0c1d2e3f4a5b",
            "name": "Promenade",
            "activeMachines": [{"category": "B3"}, {"category": "C"}]
        }"#;
        let snapshot: ArcadeSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.arcade.name, "Promenade");
        assert_eq!(snapshot.machines.len(), 2);
    }

    #[test]
    fn overview_serializes_contract_keys() {
        let overview = evaluate_organization_compliance(&[snapshot("One", 0, 5)]);
        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["summary"]["totalArcades"], 1);
        assert_eq!(json["summary"]["compliancePercentage"], 100);
        assert_eq!(json["arcadeDetails"][0]["arcade"]["name"], "One");
        assert!(json["arcadeDetails"][0]["compliance"]["isCompliant"].is_boolean());
    }
}
