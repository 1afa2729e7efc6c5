//! # Compliance API
//!
//! Read-only compliance endpoints. Nothing here writes: every verdict is
//! recomputed from the current machine snapshot on each request.
//!
//! - `GET /v1/arcades/{id}/compliance`: single-arcade check
//! - `GET /v1/compliance/overview?organizationId=`: organization summary
//! - `POST /v1/compliance/inventory`: onboarding draft validation

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use acm_compliance::{
    check_arcade, organization_overview, validate_inventory, ComplianceCheckResult,
    InventoryEntry, InventoryReport, OrganizationComplianceOverview,
};
use acm_core::{ArcadeId, OrganizationId};

use crate::auth::{require_organization, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query};
use crate::middleware::metrics::record_compliance;
use crate::routes::arcades::load_arcade;
use crate::state::AppState;

/// Re-evaluate one arcade from its current machines and count the outcome.
pub(crate) fn fresh_compliance(
    state: &AppState,
    arcade: ArcadeId,
) -> Result<ComplianceCheckResult, AppError> {
    let result = check_arcade(state, arcade)?;
    record_compliance(&result);
    Ok(result)
}

// ── Request/Response DTOs ───────────────────────────────────────────

/// Query for the organization overview.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct OverviewQuery {
    /// Organization to summarise. Required.
    pub organization_id: Option<Uuid>,
}

/// Organization overview stamped with the evaluation time.
#[derive(Debug, Serialize, ToSchema)]
pub struct OverviewResponse {
    #[schema(value_type = Object)]
    pub overview: OrganizationComplianceOverview,
    /// RFC 3339 evaluation time.
    pub timestamp: String,
}

/// Onboarding draft submitted for validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryRequest {
    #[schema(value_type = Vec<Object>)]
    pub machines: Vec<InventoryEntry>,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/arcades/{id}/compliance", get(arcade_compliance))
        .route("/v1/compliance/overview", get(compliance_overview))
        .route("/v1/compliance/inventory", post(validate_inventory_draft))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/arcades/{id}/compliance — Check one arcade.
#[utoipa::path(
    get,
    path = "/v1/arcades/{id}/compliance",
    params(("id" = Uuid, Path, description = "Arcade ID")),
    responses(
        (status = 200, description = "Compliance verdict", body = serde_json::Value),
        (status = 404, description = "Arcade not found", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub async fn arcade_compliance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ComplianceCheckResult>, AppError> {
    let arcade = load_arcade(&state, &caller, ArcadeId::from_uuid(extract_path(id)?))?;
    fresh_compliance(&state, arcade.id).map(Json)
}

/// GET /v1/compliance/overview — Organization-wide summary.
#[utoipa::path(
    get,
    path = "/v1/compliance/overview",
    params(OverviewQuery),
    responses(
        (status = 200, description = "Organization overview", body = OverviewResponse),
        (status = 400, description = "Missing organizationId", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub async fn compliance_overview(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<OverviewQuery>, QueryRejection>,
) -> Result<Json<OverviewResponse>, AppError> {
    let organization = extract_query(query)?
        .organization_id
        .map(OrganizationId::from_uuid)
        .ok_or_else(|| AppError::BadRequest("Organization ID is required".to_string()))?;
    require_organization(&caller, organization)?;

    let overview = organization_overview(&state, organization)?;
    for detail in &overview.arcade_details {
        record_compliance(&detail.compliance);
    }
    if overview.summary.arcades_with_issues > 0 {
        tracing::warn!(
            organization_id = %organization,
            arcades_with_issues = overview.summary.arcades_with_issues,
            total_arcades = overview.summary.total_arcades,
            "organization has non-compliant arcades"
        );
    }

    Ok(Json(OverviewResponse {
        overview,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// POST /v1/compliance/inventory — Validate an onboarding draft.
#[utoipa::path(
    post,
    path = "/v1/compliance/inventory",
    request_body = InventoryRequest,
    responses(
        (status = 200, description = "Draft accepted", body = serde_json::Value),
        (status = 400, description = "Malformed body", body = crate::error::ErrorBody),
        (status = 422, description = "Draft rejected", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub async fn validate_inventory_draft(
    _caller: CallerIdentity,
    body: Result<Json<InventoryRequest>, JsonRejection>,
) -> Result<Json<InventoryReport>, AppError> {
    let req = extract_json(body)?;
    let report = validate_inventory(&req.machines).map_err(|e| {
        tracing::info!(rows = req.machines.len(), error = %e, "inventory draft rejected");
        AppError::from(e)
    })?;
    record_compliance(&report.compliance);
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures;
    use acm_core::MachineCategory;

    #[test]
    fn fresh_compliance_reflects_current_machines() {
        let state = AppState::new();
        let org = fixtures::organization("Seaside Leisure");
        let arcade = fixtures::arcade(org.id, "Pier Arcade");
        state.organizations.insert(*org.id.as_uuid(), org);
        state.arcades.insert(*arcade.id.as_uuid(), arcade.clone());

        let empty = fresh_compliance(&state, arcade.id).unwrap();
        assert!(empty.is_compliant);
        assert_eq!(empty.machine_breakdown.total, 0);

        state
            .machines
            .register(fixtures::machine(arcade.id, "SN-1", MachineCategory::B3))
            .unwrap();
        let single_b3 = fresh_compliance(&state, arcade.id).unwrap();
        assert!(!single_b3.is_compliant);
        assert_eq!(single_b3.machine_breakdown.b3_count, 1);
    }

    #[test]
    fn fresh_compliance_unknown_arcade_is_not_found() {
        let state = AppState::new();
        let err = fresh_compliance(&state, ArcadeId::new()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn inventory_request_parses_category_tags() {
        let req: InventoryRequest = serde_json::from_str(
            r#"{"machines": [{"serialNumber": "SN-1", "category": "C"}, {"serialNumber": "", "category": "D"}]}"#,
        )
        .unwrap();
        assert_eq!(req.machines.len(), 2);
        assert_eq!(req.machines[0].category, MachineCategory::C);
    }
}
