//! # Arcades API
//!
//! - `GET /v1/arcades?organizationId=`: arcades of one organization (or all
//!   visible to the caller), name ascending
//! - `POST /v1/arcades`: set up an arcade; the response carries a compliance
//!   preview computed from the declared machine counts
//! - `GET /v1/arcades/{id}`: fetch one arcade
//!
//! Declared counts are parsed leniently: numbers, numeric strings and
//! missing values are accepted, anything unparseable counts as zero.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use acm_compliance::{evaluate_tally, ComplianceCheckResult};
use acm_core::{ArcadeId, OrganizationId};

use crate::auth::{require_organization, require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_path, extract_query, extract_validated_json, non_blank, Validate};
use crate::middleware::metrics::record_compliance;
use crate::state::{AppState, ArcadeRecord, DeclaredMachines};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to set up an arcade.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArcadeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub premises_license_no: Option<String>,
    #[serde(default)]
    pub local_authority: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default, alias = "category_b3_machines", deserialize_with = "lenient_count")]
    #[schema(value_type = Option<u32>)]
    pub category_b3_machines: u32,
    #[serde(default, alias = "category_c_machines", deserialize_with = "lenient_count")]
    #[schema(value_type = Option<u32>)]
    pub category_c_machines: u32,
    #[serde(default, alias = "category_d_machines", deserialize_with = "lenient_count")]
    #[schema(value_type = Option<u32>)]
    pub category_d_machines: u32,
    #[serde(default, alias = "other_machines", deserialize_with = "lenient_count")]
    #[schema(value_type = Option<u32>)]
    pub other_machines: u32,
}

/// Largest declared count a stored arcade can hold.
const MAX_DECLARED_COUNT: u32 = i32::MAX as u32;

impl Validate for CreateArcadeRequest {
    fn validate(&self) -> Result<(), String> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.name) || self.organization_id.is_none() || !present(&self.address) {
            return Err("Name, organization ID, and address are required".to_string());
        }
        let counts = [
            self.category_b3_machines,
            self.category_c_machines,
            self.category_d_machines,
            self.other_machines,
        ];
        if counts.iter().any(|n| *n > MAX_DECLARED_COUNT) {
            return Err(format!(
                "Declared machine counts must not exceed {MAX_DECLARED_COUNT}"
            ));
        }
        Ok(())
    }
}

/// Created arcade with its setup-time compliance preview.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArcadeResponse {
    pub arcade: ArcadeRecord,
    #[schema(value_type = Object)]
    pub compliance_preview: ComplianceCheckResult,
}

/// Arcade listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArcadeListResponse {
    pub arcades: Vec<ArcadeRecord>,
}

/// Query for the arcade listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ArcadeListQuery {
    /// Restrict to one organization.
    pub organization_id: Option<Uuid>,
}

/// Accept a JSON number or numeric string; anything else is zero. Values
/// too large for `u32` saturate so validation can reject them.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                0
            } else {
                digits.parse().unwrap_or(u32::MAX)
            }
        }
        _ => 0,
    })
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/arcades", get(list_arcades).post(create_arcade))
        .route("/v1/arcades/{id}", get(get_arcade))
}

/// Load an arcade the caller may see, or 404 / 403.
pub(crate) fn load_arcade(
    state: &AppState,
    caller: &CallerIdentity,
    id: ArcadeId,
) -> Result<ArcadeRecord, AppError> {
    let arcade = state
        .arcades
        .get(id.as_uuid())
        .ok_or_else(|| AppError::NotFound("Arcade not found".to_string()))?;
    require_organization(caller, arcade.organization_id)?;
    Ok(arcade)
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/arcades — List arcades sorted by name.
#[utoipa::path(
    get,
    path = "/v1/arcades",
    params(ArcadeListQuery),
    responses(
        (status = 200, description = "Arcades", body = ArcadeListResponse),
        (status = 403, description = "Other organization", body = crate::error::ErrorBody),
    ),
    tag = "arcades"
)]
pub async fn list_arcades(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<ArcadeListQuery>, QueryRejection>,
) -> Result<Json<ArcadeListResponse>, AppError> {
    let query = extract_query(query)?;
    let organization = match query.organization_id.map(OrganizationId::from_uuid) {
        Some(org) => {
            require_organization(&caller, org)?;
            Some(org)
        }
        None => caller.organization_id,
    };
    Ok(Json(ArcadeListResponse {
        arcades: state.arcades_sorted(organization),
    }))
}

/// POST /v1/arcades — Set up an arcade.
#[utoipa::path(
    post,
    path = "/v1/arcades",
    request_body = CreateArcadeRequest,
    responses(
        (status = 201, description = "Arcade created", body = CreateArcadeResponse),
        (status = 404, description = "Unknown organization", body = crate::error::ErrorBody),
        (status = 422, description = "Missing required fields", body = crate::error::ErrorBody),
    ),
    tag = "arcades"
)]
pub async fn create_arcade(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateArcadeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateArcadeResponse>), AppError> {
    require_role(&caller, Role::Manager)?;
    let req = extract_validated_json(body)?;

    let organization_id = req
        .organization_id
        .map(OrganizationId::from_uuid)
        .ok_or_else(|| AppError::Validation("organization ID is required".into()))?;
    require_organization(&caller, organization_id)?;
    if !state.organizations.contains(organization_id.as_uuid()) {
        return Err(AppError::NotFound(format!(
            "organization {organization_id} not found"
        )));
    }

    let now = Utc::now();
    let record = ArcadeRecord {
        id: ArcadeId::new(),
        organization_id,
        name: req.name.unwrap_or_default().trim().to_string(),
        address: req.address.unwrap_or_default().trim().to_string(),
        city: non_blank(req.city),
        postcode: non_blank(req.postcode),
        country: non_blank(req.country),
        premises_license_no: non_blank(req.premises_license_no),
        local_authority: non_blank(req.local_authority),
        opening_hours: non_blank(req.opening_hours),
        contact_phone: non_blank(req.contact_phone),
        contact_email: non_blank(req.contact_email),
        declared_machines: DeclaredMachines {
            category_b3_machines: req.category_b3_machines,
            category_c_machines: req.category_c_machines,
            category_d_machines: req.category_d_machines,
            other_machines: req.other_machines,
        },
        created_at: now,
        updated_at: now,
    };

    if let Some(pool) = &state.db_pool {
        crate::db::arcades::insert(pool, &record).await?;
    }
    state.arcades.insert(*record.id.as_uuid(), record.clone());

    let preview = evaluate_tally(&record.declared_machines.tally());
    record_compliance(&preview);
    if preview.is_compliant {
        tracing::info!(arcade_id = %record.id, name = %record.name, "arcade created");
    } else {
        tracing::warn!(
            arcade_id = %record.id,
            issues = ?preview.issues,
            "arcade created with non-compliant declared machine mix"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateArcadeResponse {
            arcade: record,
            compliance_preview: preview,
        }),
    ))
}

/// GET /v1/arcades/{id} — Fetch an arcade.
#[utoipa::path(
    get,
    path = "/v1/arcades/{id}",
    params(("id" = Uuid, Path, description = "Arcade ID")),
    responses(
        (status = 200, description = "Arcade", body = ArcadeRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "arcades"
)]
pub async fn get_arcade(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ArcadeRecord>, AppError> {
    let id = ArcadeId::from_uuid(extract_path(id)?);
    load_arcade(&state, &caller, id).map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateArcadeRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn counts_accept_numbers_and_strings() {
        let req = parse(
            r#"{"categoryB3Machines": 2, "category_c_machines": "8", "categoryDMachines": "3 units", "otherMachines": null}"#,
        );
        assert_eq!(req.category_b3_machines, 2);
        assert_eq!(req.category_c_machines, 8);
        assert_eq!(req.category_d_machines, 3);
        assert_eq!(req.other_machines, 0);
    }

    #[test]
    fn unparseable_counts_are_zero() {
        let req = parse(r#"{"categoryB3Machines": "many", "categoryCMachines": -4, "categoryDMachines": true}"#);
        assert_eq!(req.category_b3_machines, 0);
        assert_eq!(req.category_c_machines, 0);
        assert_eq!(req.category_d_machines, 0);
    }

    #[test]
    fn oversized_counts_fail_validation() {
        let req = parse(&format!(
            r#"{{"name": "Pier", "organizationId": "{}", "address": "1 Marine Parade", "categoryB3Machines": 3000000000}}"#,
            Uuid::new_v4()
        ));
        assert_eq!(req.category_b3_machines, 3_000_000_000);
        assert_eq!(
            req.validate().unwrap_err(),
            "Declared machine counts must not exceed 2147483647"
        );

        let huge = parse(r#"{"categoryCMachines": 99999999999, "categoryDMachines": "99999999999"}"#);
        assert_eq!(huge.category_c_machines, u32::MAX);
        assert_eq!(huge.category_d_machines, u32::MAX);
    }

    #[test]
    fn required_fields() {
        let missing = parse(r#"{"name": "Pier", "address": "  "}"#);
        assert_eq!(
            missing.validate().unwrap_err(),
            "Name, organization ID, and address are required"
        );
        let ok = CreateArcadeRequest {
            name: Some("Pier".into()),
            organization_id: Some(Uuid::new_v4()),
            address: Some("1 Marine Parade".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }
}
