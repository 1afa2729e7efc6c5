//! # Machines API
//!
//! - `GET /v1/arcades/{id}/machines`: machines newest first, with live compliance
//! - `POST /v1/arcades/{id}/machines`: register a machine (409 on duplicate serial)
//! - `PATCH /v1/machines/{id}`: edit a machine, including `isActive` and category
//! - `DELETE /v1/machines/{id}`: remove a machine
//!
//! Every mutation answers with the arcade's compliance re-evaluated after
//! the change. Serial uniqueness is claimed in the in-memory registry
//! first; when persistence is enabled a failed write-through is undone.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use acm_compliance::ComplianceCheckResult;
use acm_core::{ArcadeId, MachineCategory, MachineId, SerialNumber};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_path, extract_validated_json, non_blank, Validate};
use crate::routes::arcades::load_arcade;
use crate::routes::compliance::fresh_compliance;
use crate::state::{AppState, MachineRecord};

const CATEGORY_MESSAGE: &str = "Category must be B3, C, or D";

/// Parse a category accepted for registration: B3, C or D.
fn regulated_category(tag: &str) -> Result<MachineCategory, String> {
    tag.parse::<MachineCategory>()
        .ok()
        .filter(MachineCategory::is_regulated)
        .ok_or_else(|| CATEGORY_MESSAGE.to_string())
}

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a machine.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMachineRequest {
    #[serde(default)]
    pub serial_number: Option<String>,
    /// B3, C or D.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub install_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Validate for RegisterMachineRequest {
    fn validate(&self) -> Result<(), String> {
        let serial = self.serial_number.as_deref().map(str::trim).unwrap_or("");
        let category = self.category.as_deref().map(str::trim).unwrap_or("");
        if serial.is_empty() || category.is_empty() {
            return Err("Serial number and category are required".to_string());
        }
        regulated_category(category)?;
        SerialNumber::new(serial).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Partial machine update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineRequest {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub install_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateMachineRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(category) = &self.category {
            regulated_category(category)?;
        }
        if let Some(serial) = &self.serial_number {
            SerialNumber::new(serial.as_str()).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

/// Machines of an arcade with its live compliance.
#[derive(Debug, Serialize, ToSchema)]
pub struct MachineListResponse {
    pub machines: Vec<MachineRecord>,
    #[schema(value_type = Object)]
    pub compliance: ComplianceCheckResult,
}

/// A created or updated machine and the arcade's fresh compliance.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineMutationResponse {
    pub machine: MachineRecord,
    #[schema(value_type = Object)]
    pub compliance_check: ComplianceCheckResult,
}

/// Result of removing a machine.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineRemovedResponse {
    #[schema(value_type = String, format = Uuid)]
    pub removed: MachineId,
    #[schema(value_type = Object)]
    pub compliance_check: ComplianceCheckResult,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/arcades/{id}/machines",
            get(list_machines).post(register_machine),
        )
        .route("/v1/machines/{id}", patch(update_machine).delete(remove_machine))
}

fn load_machine(state: &AppState, id: MachineId) -> Result<MachineRecord, AppError> {
    state
        .machines
        .get(id)
        .ok_or_else(|| AppError::NotFound("Machine not found".to_string()))
}

/// Undo an in-memory change whose write-through failed. If the serial was
/// claimed by another machine in the meantime the newer claim wins and the
/// registry keeps the current version.
fn rollback(state: &AppState, previous: MachineRecord) {
    let machine_id = previous.id;
    if let Err(e) = state.machines.restore(previous) {
        tracing::error!(
            machine_id = %machine_id,
            error = %e,
            "rollback skipped: serial number reclaimed during write-through"
        );
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/arcades/{id}/machines — Machines and live compliance.
#[utoipa::path(
    get,
    path = "/v1/arcades/{id}/machines",
    params(("id" = Uuid, Path, description = "Arcade ID")),
    responses(
        (status = 200, description = "Machines, newest first", body = MachineListResponse),
        (status = 404, description = "Arcade not found", body = crate::error::ErrorBody),
    ),
    tag = "machines"
)]
pub async fn list_machines(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MachineListResponse>, AppError> {
    let arcade = load_arcade(&state, &caller, ArcadeId::from_uuid(extract_path(id)?))?;
    let machines = state.machines.for_arcade(arcade.id);
    let compliance = fresh_compliance(&state, arcade.id)?;
    Ok(Json(MachineListResponse {
        machines,
        compliance,
    }))
}

/// POST /v1/arcades/{id}/machines — Register a machine.
#[utoipa::path(
    post,
    path = "/v1/arcades/{id}/machines",
    params(("id" = Uuid, Path, description = "Arcade ID")),
    request_body = RegisterMachineRequest,
    responses(
        (status = 201, description = "Machine registered", body = MachineMutationResponse),
        (status = 404, description = "Arcade not found", body = crate::error::ErrorBody),
        (status = 409, description = "Serial number already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "machines"
)]
pub async fn register_machine(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<RegisterMachineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MachineMutationResponse>), AppError> {
    require_role(&caller, Role::Manager)?;
    let arcade = load_arcade(&state, &caller, ArcadeId::from_uuid(extract_path(id)?))?;
    let req = extract_validated_json(body)?;

    let serial_number = SerialNumber::new(req.serial_number.unwrap_or_default())?;
    let category = regulated_category(req.category.as_deref().unwrap_or_default())
        .map_err(AppError::Validation)?;

    let now = Utc::now();
    let record = MachineRecord {
        id: MachineId::new(),
        arcade_id: arcade.id,
        serial_number,
        manufacturer: non_blank(req.manufacturer),
        model: non_blank(req.model),
        category,
        install_date: req.install_date,
        location: non_blank(req.location),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let machine = state.machines.register(record).map_err(|e| {
        tracing::info!(arcade_id = %arcade.id, error = %e, "machine registration rejected");
        AppError::from(e)
    })?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::machines::insert(pool, &machine).await {
            state.machines.remove(machine.id);
            return Err(if crate::db::is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Machine with serial number {} already exists",
                    machine.serial_number
                ))
            } else {
                e.into()
            });
        }
    }

    tracing::info!(
        arcade_id = %arcade.id,
        machine_id = %machine.id,
        serial = %machine.serial_number,
        category = %machine.category,
        "machine registered"
    );

    let compliance_check = fresh_compliance(&state, arcade.id)?;
    Ok((
        StatusCode::CREATED,
        Json(MachineMutationResponse {
            machine,
            compliance_check,
        }),
    ))
}

/// PATCH /v1/machines/{id} — Edit a machine.
#[utoipa::path(
    patch,
    path = "/v1/machines/{id}",
    params(("id" = Uuid, Path, description = "Machine ID")),
    request_body = UpdateMachineRequest,
    responses(
        (status = 200, description = "Machine updated", body = MachineMutationResponse),
        (status = 404, description = "Machine not found", body = crate::error::ErrorBody),
        (status = 409, description = "Serial number already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "machines"
)]
pub async fn update_machine(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateMachineRequest>, JsonRejection>,
) -> Result<Json<MachineMutationResponse>, AppError> {
    require_role(&caller, Role::Manager)?;
    let existing = load_machine(&state, MachineId::from_uuid(extract_path(id)?))?;
    load_arcade(&state, &caller, existing.arcade_id)?;
    let req = extract_validated_json(body)?;

    let serial_number = req.serial_number.map(SerialNumber::new).transpose()?;
    let category = req
        .category
        .as_deref()
        .map(regulated_category)
        .transpose()
        .map_err(AppError::Validation)?;

    let update = state
        .machines
        .update(existing.id, |m| {
            if let Some(serial) = serial_number {
                m.serial_number = serial;
            }
            if let Some(category) = category {
                m.category = category;
            }
            if let Some(manufacturer) = req.manufacturer {
                m.manufacturer = non_blank(Some(manufacturer));
            }
            if let Some(model) = req.model {
                m.model = non_blank(Some(model));
            }
            if let Some(date) = req.install_date {
                m.install_date = Some(date);
            }
            if let Some(location) = req.location {
                m.location = non_blank(Some(location));
            }
            if let Some(active) = req.is_active {
                m.is_active = active;
            }
            m.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound("Machine not found".to_string()))??;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::machines::update(pool, &update.current).await {
            rollback(&state, update.previous);
            return Err(e.into());
        }
    }

    tracing::info!(
        machine_id = %update.current.id,
        arcade_id = %update.current.arcade_id,
        is_active = update.current.is_active,
        "machine updated"
    );

    let compliance_check = fresh_compliance(&state, update.current.arcade_id)?;
    Ok(Json(MachineMutationResponse {
        machine: update.current,
        compliance_check,
    }))
}

/// DELETE /v1/machines/{id} — Remove a machine.
#[utoipa::path(
    delete,
    path = "/v1/machines/{id}",
    params(("id" = Uuid, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Machine removed", body = MachineRemovedResponse),
        (status = 404, description = "Machine not found", body = crate::error::ErrorBody),
    ),
    tag = "machines"
)]
pub async fn remove_machine(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MachineRemovedResponse>, AppError> {
    require_role(&caller, Role::Manager)?;
    let existing = load_machine(&state, MachineId::from_uuid(extract_path(id)?))?;
    load_arcade(&state, &caller, existing.arcade_id)?;

    let removed = state
        .machines
        .remove(existing.id)
        .ok_or_else(|| AppError::NotFound("Machine not found".to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::machines::delete(pool, removed.id).await {
            rollback(&state, removed);
            return Err(e.into());
        }
    }

    tracing::info!(machine_id = %removed.id, arcade_id = %removed.arcade_id, "machine removed");

    let compliance_check = fresh_compliance(&state, removed.arcade_id)?;
    Ok(Json(MachineRemovedResponse {
        removed: removed.id,
        compliance_check,
    }))
}
