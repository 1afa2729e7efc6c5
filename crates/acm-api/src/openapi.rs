//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Arcade Compliance Manager API",
        version = "0.1.0",
        description = "Machine registry and B3 quota compliance for licensed arcades.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Organizations
        crate::routes::organizations::create_organization,
        crate::routes::organizations::get_organization,
        // Arcades
        crate::routes::arcades::list_arcades,
        crate::routes::arcades::create_arcade,
        crate::routes::arcades::get_arcade,
        // Machines
        crate::routes::machines::list_machines,
        crate::routes::machines::register_machine,
        crate::routes::machines::update_machine,
        crate::routes::machines::remove_machine,
        // Compliance
        crate::routes::compliance::arcade_compliance,
        crate::routes::compliance::compliance_overview,
        crate::routes::compliance::validate_inventory_draft,
    ),
    components(schemas(
        // State record types
        crate::state::OrganizationRecord,
        crate::state::ArcadeRecord,
        crate::state::DeclaredMachines,
        crate::state::MachineRecord,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Organization DTOs
        crate::routes::organizations::CreateOrganizationRequest,
        // Arcade DTOs
        crate::routes::arcades::CreateArcadeRequest,
        crate::routes::arcades::CreateArcadeResponse,
        crate::routes::arcades::ArcadeListResponse,
        // Machine DTOs
        crate::routes::machines::RegisterMachineRequest,
        crate::routes::machines::UpdateMachineRequest,
        crate::routes::machines::MachineListResponse,
        crate::routes::machines::MachineMutationResponse,
        crate::routes::machines::MachineRemovedResponse,
        // Compliance DTOs
        crate::routes::compliance::OverviewResponse,
        crate::routes::compliance::InventoryRequest,
    )),
    tags(
        (name = "organizations", description = "Operator organizations"),
        (name = "arcades", description = "Licensed arcade premises"),
        (name = "machines", description = "Gaming machine registry"),
        (name = "compliance", description = "B3 quota compliance evaluation"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
