//! # Organizations API
//!
//! - `POST /v1/organizations`: create an operator organization (admin)
//! - `GET /v1/organizations/{id}`: fetch one organization

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use acm_core::OrganizationId;

use crate::auth::{require_organization, require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_path, extract_validated_json, non_blank, Validate};
use crate::state::{AppState, OrganizationRecord};

/// Request to create an organization.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub company_number: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl Validate for CreateOrganizationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Organization name is required".to_string());
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/organizations", post(create_organization))
        .route("/v1/organizations/{id}", get(get_organization))
}

/// POST /v1/organizations — Create an organization.
#[utoipa::path(
    post,
    path = "/v1/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationRecord),
        (status = 403, description = "Admin role required", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateOrganizationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrganizationRecord>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;

    let record = OrganizationRecord {
        id: OrganizationId::new(),
        name: req.name.trim().to_string(),
        company_number: non_blank(req.company_number),
        contact_email: non_blank(req.contact_email),
        created_at: Utc::now(),
    };

    if let Some(pool) = &state.db_pool {
        crate::db::organizations::insert(pool, &record).await?;
    }
    state.organizations.insert(*record.id.as_uuid(), record.clone());

    tracing::info!(organization_id = %record.id, name = %record.name, "organization created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/organizations/{id} — Fetch an organization.
#[utoipa::path(
    get,
    path = "/v1/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization", body = OrganizationRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "organizations"
)]
pub async fn get_organization(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrganizationRecord>, AppError> {
    let id = extract_path(id)?;
    require_organization(&caller, OrganizationId::from_uuid(id))?;
    state
        .organizations
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("organization {id} not found")))
}
