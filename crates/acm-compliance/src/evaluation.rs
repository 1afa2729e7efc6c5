//! # Single-Arcade Compliance Evaluation
//!
//! Applies the B3 quota to the active machines of one arcade and produces a
//! [`ComplianceCheckResult`].
//!
//! ## Decision rule
//!
//! ```text
//! total          = active machines (B3 + C + D + OTHER)
//! max_b3_allowed = floor(total * 20%)
//! is_compliant   = b3 <= max_b3_allowed
//! ```
//!
//! The verdict compares integer counts. The rounded `b3_percentage` is for
//! display only and never feeds the decision.
//!
//! ## Warnings
//!
//! At most one quota warning fires, checked in order: "at the limit"
//! (`b3 == max`), then "approaching" (`b3 >= max * 0.8`). Both require a
//! non-empty arcade. An empty arcade gets the separate "no machines"
//! warning and is vacuously compliant.

use serde::{Deserialize, Serialize};

use crate::machine::MachineView;
use crate::quota::QuotaPolicy;
use crate::tally::MachineTally;

/// Numeric breakdown accompanying a compliance verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineBreakdown {
    /// All active machines, including `OTHER`.
    pub total: usize,
    pub b3_count: usize,
    pub c_count: usize,
    pub d_count: usize,
    /// B3 share of the total, rounded to one decimal place.
    pub b3_percentage: f64,
    /// Floor of 20% of `total`.
    pub max_b3_allowed: usize,
}

/// Compliance verdict for one arcade. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheckResult {
    pub is_compliant: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub machine_breakdown: MachineBreakdown,
}

impl ComplianceCheckResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Evaluate the B3 quota over a machine set.
///
/// Inactive machines are filtered out here, so callers may pass the full
/// machine list of an arcade. Never fails, including for an empty set.
pub fn evaluate_arcade_compliance<I>(machines: I) -> ComplianceCheckResult
where
    I: IntoIterator,
    I::Item: MachineView,
{
    evaluate_tally(&MachineTally::from_machines(machines))
}

/// Evaluate the B3 quota over precomputed counts.
pub fn evaluate_tally(tally: &MachineTally) -> ComplianceCheckResult {
    evaluate_with_policy(tally, &QuotaPolicy::B3)
}

/// Evaluate a tally against an explicit quota policy.
pub fn evaluate_with_policy(tally: &MachineTally, policy: &QuotaPolicy) -> ComplianceCheckResult {
    let total = tally.total();
    let b3_count = tally.b3();

    let b3_percentage = if total > 0 {
        round_one_decimal(b3_count as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    let max_b3_allowed = policy.max_allowed(total);

    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if !policy.permits(b3_count, total) {
        issues.push(format!(
            "B3 machine limit exceeded: {b3_count} B3 machines ({b3_percentage:.1}%) exceeds the maximum allowed of {max_b3_allowed} ({}% of {total} total machines)",
            policy.limit_percent
        ));
    }

    if total > 0 {
        if b3_count == max_b3_allowed {
            warnings.push(format!(
                "B3 machine limit reached: {b3_count} B3 machines ({b3_percentage:.1}%) is at the maximum allowed limit"
            ));
        } else if policy.is_approaching(b3_count, max_b3_allowed) {
            warnings.push(format!(
                "Approaching B3 machine limit: {b3_count} B3 machines ({b3_percentage:.1}%) is close to the maximum allowed of {max_b3_allowed}"
            ));
        }
    }

    if total == 0 {
        warnings.push("No machines registered in this arcade".to_string());
    }

    ComplianceCheckResult {
        is_compliant: issues.is_empty(),
        issues,
        warnings,
        machine_breakdown: MachineBreakdown {
            total,
            b3_count,
            c_count: tally.c(),
            d_count: tally.d(),
            b3_percentage,
            max_b3_allowed,
        },
    }
}

/// Round half away from zero to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::MachineSnapshot;
    use acm_core::MachineCategory;

    fn arcade(b3: usize, c: usize, d: usize, other: usize) -> Vec<MachineSnapshot> {
        let mut machines = Vec::new();
        machines.extend((0..b3).map(|_| MachineSnapshot::active(MachineCategory::B3)));
        machines.extend((0..c).map(|_| MachineSnapshot::active(MachineCategory::C)));
        machines.extend((0..d).map(|_| MachineSnapshot::active(MachineCategory::D)));
        machines.extend((0..other).map(|_| MachineSnapshot::active(MachineCategory::Other)));
        machines
    }

    #[test]
    fn empty_arcade_is_compliant_with_warning() {
        let result = evaluate_arcade_compliance(Vec::<MachineSnapshot>::new());
        assert!(result.is_compliant);
        assert!(result.issues.is_empty());
        assert_eq!(result.warnings, vec!["No machines registered in this arcade"]);
        assert_eq!(
            result.machine_breakdown,
            MachineBreakdown {
                total: 0,
                b3_count: 0,
                c_count: 0,
                d_count: 0,
                b3_percentage: 0.0,
                max_b3_allowed: 0,
            }
        );
    }

    #[test]
    fn single_b3_is_non_compliant_and_approaching() {
        let result = evaluate_arcade_compliance(arcade(1, 0, 0, 0));
        assert!(!result.is_compliant);
        assert_eq!(result.machine_breakdown.total, 1);
        assert_eq!(result.machine_breakdown.max_b3_allowed, 0);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(
            result.issues[0],
            "B3 machine limit exceeded: 1 B3 machines (100.0%) exceeds the maximum allowed of 0 (20% of 1 total machines)"
        );
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Approaching B3 machine limit"));
    }

    #[test]
    fn exactly_at_limit_warns_without_issue() {
        let result = evaluate_arcade_compliance(arcade(2, 5, 3, 0));
        assert!(result.is_compliant);
        assert!(result.issues.is_empty());
        assert_eq!(result.machine_breakdown.max_b3_allowed, 2);
        assert_eq!(
            result.warnings,
            vec!["B3 machine limit reached: 2 B3 machines (20.0%) is at the maximum allowed limit"]
        );
    }

    #[test]
    fn one_over_limit_reports_all_numbers() {
        let result = evaluate_arcade_compliance(arcade(3, 4, 3, 0));
        assert!(!result.is_compliant);
        assert_eq!(
            result.issues,
            vec!["B3 machine limit exceeded: 3 B3 machines (30.0%) exceeds the maximum allowed of 2 (20% of 10 total machines)"]
        );
        assert_eq!(result.machine_breakdown.b3_percentage, 30.0);
        // 3 >= 2 * 0.8, so the approaching tier also fires.
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("close to the maximum allowed of 2"));
    }

    #[test]
    fn floor_not_round_for_maximum() {
        // floor(1.8) = 1
        let nine = evaluate_arcade_compliance(arcade(1, 8, 0, 0));
        assert_eq!(nine.machine_breakdown.max_b3_allowed, 1);
        assert!(nine.is_compliant);

        // floor(2.2) = 2
        let eleven = evaluate_arcade_compliance(arcade(2, 9, 0, 0));
        assert_eq!(eleven.machine_breakdown.max_b3_allowed, 2);
        assert!(eleven.is_compliant);

        // round(1.8) would allow 2 here; floor does not.
        let strict = evaluate_arcade_compliance(arcade(2, 7, 0, 0));
        assert_eq!(strict.machine_breakdown.max_b3_allowed, 1);
        assert!(!strict.is_compliant);
    }

    #[test]
    fn other_counts_toward_total_only() {
        let result = evaluate_arcade_compliance(arcade(1, 0, 0, 4));
        let b = &result.machine_breakdown;
        assert_eq!(b.total, 5);
        assert_eq!(b.b3_count + b.c_count + b.d_count, 1);
        assert_eq!(b.max_b3_allowed, 1);
        assert!(result.is_compliant);
    }

    #[test]
    fn inactive_machines_are_excluded() {
        let mut machines = arcade(1, 4, 0, 0);
        machines.push(MachineSnapshot::inactive(MachineCategory::B3));
        machines.push(MachineSnapshot::inactive(MachineCategory::B3));
        let result = evaluate_arcade_compliance(&machines);
        assert_eq!(result.machine_breakdown.total, 5);
        assert_eq!(result.machine_breakdown.b3_count, 1);
        assert!(result.is_compliant);
    }

    #[test]
    fn all_inactive_counts_as_empty() {
        let machines = vec![
            MachineSnapshot::inactive(MachineCategory::B3),
            MachineSnapshot::inactive(MachineCategory::C),
        ];
        let result = evaluate_arcade_compliance(machines);
        assert_eq!(result.machine_breakdown.total, 0);
        assert!(result.is_compliant);
        assert_eq!(result.warnings, vec!["No machines registered in this arcade"]);
    }

    #[test]
    fn no_b3_in_large_arcade_has_no_warnings() {
        let result = evaluate_arcade_compliance(arcade(0, 10, 10, 0));
        assert!(result.is_compliant);
        assert!(result.warnings.is_empty());
        assert_eq!(result.machine_breakdown.b3_percentage, 0.0);
    }

    #[test]
    fn no_b3_in_small_arcade_is_at_limit() {
        // max = floor(0.6) = 0 and b3 = 0, so the at-limit tier fires.
        let result = evaluate_arcade_compliance(arcade(0, 3, 0, 0));
        assert!(result.is_compliant);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("B3 machine limit reached: 0 B3 machines (0.0%)"));
    }

    #[test]
    fn approaching_tier_below_limit() {
        // total 25 -> max 5; 4 >= 5 * 0.8
        let result = evaluate_arcade_compliance(arcade(4, 21, 0, 0));
        assert!(result.is_compliant);
        assert_eq!(
            result.warnings,
            vec!["Approaching B3 machine limit: 4 B3 machines (16.0%) is close to the maximum allowed of 5"]
        );
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        // 1 / 3 = 33.333...%
        let result = evaluate_arcade_compliance(arcade(1, 2, 0, 0));
        assert_eq!(result.machine_breakdown.b3_percentage, 33.3);
        // 1 / 16 = 6.25% rounds half up
        let result = evaluate_arcade_compliance(arcade(1, 15, 0, 0));
        assert_eq!(result.machine_breakdown.b3_percentage, 6.3);
        // 3 / 16 = 18.75% is shown as 18.8 in the at-limit warning
        let result = evaluate_arcade_compliance(arcade(3, 13, 0, 0));
        assert_eq!(result.machine_breakdown.b3_percentage, 18.8);
        assert!(result.warnings[0].contains("(18.8%)"));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let machines = arcade(3, 7, 2, 1);
        let first = evaluate_arcade_compliance(&machines);
        let second = evaluate_arcade_compliance(&machines);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn declared_tally_matches_machine_tally() {
        let from_machines = evaluate_arcade_compliance(arcade(2, 6, 1, 1));
        let from_counts = evaluate_tally(&MachineTally::from_declared(2, 6, 1, 1));
        assert_eq!(from_machines, from_counts);
    }

    #[test]
    fn custom_policy_changes_threshold() {
        let policy = QuotaPolicy {
            limit_percent: 50,
            approach_ratio: 0.8,
        };
        let tally = MachineTally::from_declared(3, 3, 0, 0);
        let result = evaluate_with_policy(&tally, &policy);
        assert!(result.is_compliant);
        assert_eq!(result.machine_breakdown.max_b3_allowed, 3);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let result = evaluate_arcade_compliance(arcade(2, 8, 0, 0));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isCompliant"], true);
        assert_eq!(json["machineBreakdown"]["b3Count"], 2);
        assert_eq!(json["machineBreakdown"]["maxB3Allowed"], 2);
        assert_eq!(json["machineBreakdown"]["b3Percentage"], 20.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn machine() -> impl Strategy<Value = MachineSnapshot> {
            (
                prop_oneof![
                    Just(MachineCategory::B3),
                    Just(MachineCategory::C),
                    Just(MachineCategory::D),
                    Just(MachineCategory::Other),
                ],
                any::<bool>(),
            )
                .prop_map(|(category, is_active)| MachineSnapshot { category, is_active })
        }

        proptest! {
            /// The verdict is exactly the integer count comparison.
            #[test]
            fn verdict_is_count_comparison(machines in prop::collection::vec(machine(), 0..200)) {
                let result = evaluate_arcade_compliance(&machines);
                let b = &result.machine_breakdown;
                prop_assert_eq!(b.max_b3_allowed, b.total / 5);
                prop_assert_eq!(result.is_compliant, b.b3_count <= b.max_b3_allowed);
                prop_assert_eq!(result.issues.is_empty(), result.is_compliant);
                prop_assert!(result.issues.len() <= 1);
            }

            /// Only active machines are counted, and the breakdown never
            /// exceeds the total.
            #[test]
            fn breakdown_is_bounded_by_active_total(machines in prop::collection::vec(machine(), 0..200)) {
                let result = evaluate_arcade_compliance(&machines);
                let b = &result.machine_breakdown;
                let active = machines.iter().filter(|m| m.is_active).count();
                prop_assert_eq!(b.total, active);
                prop_assert!(b.b3_count + b.c_count + b.d_count <= b.total);
                prop_assert!((0.0..=100.0).contains(&b.b3_percentage));
            }

            /// At most one quota warning, plus the empty-arcade notice.
            #[test]
            fn warning_tiers_are_exclusive(machines in prop::collection::vec(machine(), 0..200)) {
                let result = evaluate_arcade_compliance(&machines);
                let quota_warnings = result
                    .warnings
                    .iter()
                    .filter(|w| w.contains("B3 machine limit"))
                    .count();
                prop_assert!(quota_warnings <= 1);
                if result.machine_breakdown.total == 0 {
                    prop_assert_eq!(quota_warnings, 0);
                    prop_assert_eq!(result.warnings.len(), 1);
                }
            }
        }
    }
}
