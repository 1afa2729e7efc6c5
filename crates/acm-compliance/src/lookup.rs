//! # Lookup Seams
//!
//! The evaluators take snapshots; these traits are how a caller with a
//! store supplies them. The API implements both over its in-memory stores,
//! tests implement them over plain maps.

use std::collections::HashMap;

use acm_core::{ArcadeId, OrganizationId};
use thiserror::Error;

use crate::evaluation::{evaluate_arcade_compliance, ComplianceCheckResult};
use crate::machine::MachineView;
use crate::overview::{evaluate_organization_compliance, ArcadeSnapshot, OrganizationComplianceOverview};

/// Errors raised by lookup collaborators.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("arcade {0} not found")]
    ArcadeNotFound(ArcadeId),

    /// Storage failure in the collaborator.
    #[error("lookup backend error: {0}")]
    Backend(String),
}

/// Supplies the machine set of one arcade. Inactive machines may be
/// included; the evaluator filters them.
pub trait MachineLookup {
    type Machine: MachineView;

    fn machines_for_arcade(&self, arcade: ArcadeId) -> Result<Vec<Self::Machine>, LookupError>;
}

/// Supplies the arcades of an organization with their machine snapshots.
/// An organization with no arcades, known or not, yields an empty list.
pub trait ArcadeLookup {
    fn arcades_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<ArcadeSnapshot>, LookupError>;
}

impl<M: MachineView + Clone> MachineLookup for HashMap<ArcadeId, Vec<M>> {
    type Machine = M;

    fn machines_for_arcade(&self, arcade: ArcadeId) -> Result<Vec<M>, LookupError> {
        self.get(&arcade)
            .cloned()
            .ok_or(LookupError::ArcadeNotFound(arcade))
    }
}

impl ArcadeLookup for HashMap<OrganizationId, Vec<ArcadeSnapshot>> {
    fn arcades_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<ArcadeSnapshot>, LookupError> {
        Ok(self.get(&organization).cloned().unwrap_or_default())
    }
}

/// Evaluate one arcade through a lookup.
pub fn check_arcade<L>(lookup: &L, arcade: ArcadeId) -> Result<ComplianceCheckResult, LookupError>
where
    L: MachineLookup + ?Sized,
{
    let machines = lookup.machines_for_arcade(arcade)?;
    let result = evaluate_arcade_compliance(&machines);
    if !result.is_compliant {
        tracing::warn!(
            arcade_id = %arcade,
            b3_count = result.machine_breakdown.b3_count,
            max_b3_allowed = result.machine_breakdown.max_b3_allowed,
            "arcade exceeds B3 quota"
        );
    }
    Ok(result)
}

/// Evaluate every arcade of an organization through a lookup.
pub fn organization_overview<L>(
    lookup: &L,
    organization: OrganizationId,
) -> Result<OrganizationComplianceOverview, LookupError>
where
    L: ArcadeLookup + ?Sized,
{
    let arcades = lookup.arcades_for_organization(organization)?;
    let overview = evaluate_organization_compliance(&arcades);
    tracing::debug!(
        organization_id = %organization,
        arcades = overview.summary.total_arcades,
        compliant = overview.summary.compliant_arcades,
        "organization compliance evaluated"
    );
    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::MachineSnapshot;
    use crate::overview::ArcadeRef;
    use acm_core::MachineCategory;

    #[test]
    fn check_arcade_evaluates_supplied_machines() {
        let arcade = ArcadeId::new();
        let mut store = HashMap::new();
        store.insert(
            arcade,
            vec![
                MachineSnapshot::active(MachineCategory::B3),
                MachineSnapshot::inactive(MachineCategory::B3),
                MachineSnapshot::active(MachineCategory::C),
                MachineSnapshot::active(MachineCategory::C),
                MachineSnapshot::active(MachineCategory::C),
                MachineSnapshot::active(MachineCategory::D),
            ],
        );
        let result = check_arcade(&store, arcade).unwrap();
        assert!(result.is_compliant);
        assert_eq!(result.machine_breakdown.total, 5);
        assert_eq!(result.machine_breakdown.b3_count, 1);
    }

    #[test]
    fn check_arcade_propagates_not_found() {
        let store: HashMap<ArcadeId, Vec<MachineSnapshot>> = HashMap::new();
        let missing = ArcadeId::new();
        let err = check_arcade(&store, missing).unwrap_err();
        assert!(matches!(err, LookupError::ArcadeNotFound(id) if id == missing));
    }

    #[test]
    fn overview_through_lookup() {
        let org = OrganizationId::new();
        let mut store = HashMap::new();
        store.insert(
            org,
            vec![ArcadeSnapshot {
                arcade: ArcadeRef {
                    id: ArcadeId::new(),
                    name: "Harbour".into(),
                },
                machines: vec![MachineSnapshot::active(MachineCategory::B3)],
            }],
        );
        let overview = organization_overview(&store, org).unwrap();
        assert_eq!(overview.summary.total_arcades, 1);
        assert_eq!(overview.summary.compliant_arcades, 0);
        assert_eq!(overview.summary.compliance_percentage, 0);
    }

    #[test]
    fn overview_unknown_organization_is_all_zero() {
        let store: HashMap<OrganizationId, Vec<ArcadeSnapshot>> = HashMap::new();
        let overview = organization_overview(&store, OrganizationId::new()).unwrap();
        assert!(overview.arcade_details.is_empty());
        assert_eq!(overview.summary.total_arcades, 0);
        assert_eq!(overview.summary.compliant_arcades, 0);
        assert_eq!(overview.summary.arcades_with_issues, 0);
        assert_eq!(overview.summary.compliance_percentage, 0);
    }

    struct FailingBackend;

    impl MachineLookup for FailingBackend {
        type Machine = MachineCategory;

        fn machines_for_arcade(&self, _: ArcadeId) -> Result<Vec<MachineCategory>, LookupError> {
            Err(LookupError::Backend("connection reset".into()))
        }
    }

    #[test]
    fn backend_errors_surface() {
        let err = check_arcade(&FailingBackend, ArcadeId::new()).unwrap_err();
        assert_eq!(err.to_string(), "lookup backend error: connection reset");
    }
}
