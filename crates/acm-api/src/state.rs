//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! AppState holds the operator's records:
//! - **Organizations**: operator companies owning arcades
//! - **Arcades**: licensed premises, with the machine counts declared at setup
//! - **Machines**: the live machine registry, unique by serial number
//!
//! Compliance results are never stored. Every compliance read re-evaluates
//! the current machine snapshot through [`MachineLookup`] / [`ArcadeLookup`].

use std::collections::HashMap;
use std::sync::Arc;

use acm_compliance::{
    ArcadeLookup, ArcadeRef, ArcadeSnapshot, LookupError, MachineLookup, MachineSnapshot,
    MachineTally, MachineView,
};
use acm_core::{ArcadeId, MachineCategory, MachineId, OrganizationId, SerialNumber};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::registry::MachineRegistry;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Records matching a predicate.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| predicate(v))
            .cloned()
            .collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// Operator organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: OrganizationId,
    pub name: String,
    pub company_number: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Machine counts declared when an arcade is set up.
///
/// Used for the setup-time compliance preview only. Live compliance is
/// always computed from the machine registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredMachines {
    pub category_b3_machines: u32,
    pub category_c_machines: u32,
    pub category_d_machines: u32,
    pub other_machines: u32,
}

impl DeclaredMachines {
    pub fn tally(&self) -> MachineTally {
        MachineTally::from_declared(
            self.category_b3_machines as usize,
            self.category_c_machines as usize,
            self.category_d_machines as usize,
            self.other_machines as usize,
        )
    }
}

/// Licensed arcade premises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: ArcadeId,
    #[schema(value_type = String, format = Uuid)]
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub premises_license_no: Option<String>,
    pub local_authority: Option<String>,
    pub opening_hours: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub declared_machines: DeclaredMachines,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered gaming machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: MachineId,
    #[schema(value_type = String, format = Uuid)]
    pub arcade_id: ArcadeId,
    #[schema(value_type = String)]
    pub serial_number: SerialNumber,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// B3, C, D or OTHER.
    #[schema(value_type = String)]
    pub category: MachineCategory,
    pub install_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MachineView for MachineRecord {
    fn category(&self) -> MachineCategory {
        self.category
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token`.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
}

impl AppConfig {
    /// Read `PORT` (default 8080) and `AUTH_TOKEN` from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let auth_token = std::env::var("AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self { port, auth_token }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub organizations: Store<OrganizationRecord>,
    pub arcades: Store<ArcadeRecord>,
    pub machines: MachineRegistry,

    // -- Database persistence (optional) --
    pub db_pool: Option<PgPool>,

    // -- Prometheus exposition (installed by the binary) --
    pub metrics: Option<PrometheusHandle>,

    pub config: AppConfig,
}

impl AppState {
    /// Create state with default config, in-memory only.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            organizations: Store::new(),
            arcades: Store::new(),
            machines: MachineRegistry::new(),
            db_pool,
            metrics: None,
            config,
        }
    }

    /// Attach the Prometheus handle served at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Arcades, optionally restricted to one organization, sorted by name.
    pub fn arcades_sorted(&self, organization: Option<OrganizationId>) -> Vec<ArcadeRecord> {
        let mut arcades = match organization {
            Some(org) => self.arcades.filter(|a| a.organization_id == org),
            None => self.arcades.list(),
        };
        arcades.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        arcades
    }

    /// Load all records from the database into the in-memory stores.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let organizations = crate::db::organizations::load_all(pool)
            .await
            .map_err(|e| format!("failed to load organizations: {e}"))?;
        let organization_count = organizations.len();
        for record in organizations {
            self.organizations.insert(*record.id.as_uuid(), record);
        }

        let arcades = crate::db::arcades::load_all(pool)
            .await
            .map_err(|e| format!("failed to load arcades: {e}"))?;
        let arcade_count = arcades.len();
        for record in arcades {
            self.arcades.insert(*record.id.as_uuid(), record);
        }

        let machines = crate::db::machines::load_all(pool)
            .await
            .map_err(|e| format!("failed to load machines: {e}"))?;
        let machine_count = machines.len();
        for record in machines {
            self.machines
                .register(record)
                .map_err(|e| format!("inconsistent machine table: {e}"))?;
        }

        tracing::info!(
            organizations = organization_count,
            arcades = arcade_count,
            machines = machine_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineLookup for AppState {
    type Machine = MachineRecord;

    fn machines_for_arcade(&self, arcade: ArcadeId) -> Result<Vec<MachineRecord>, LookupError> {
        if !self.arcades.contains(arcade.as_uuid()) {
            return Err(LookupError::ArcadeNotFound(arcade));
        }
        Ok(self.machines.for_arcade(arcade))
    }
}

impl ArcadeLookup for AppState {
    fn arcades_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<ArcadeSnapshot>, LookupError> {
        Ok(self
            .arcades_sorted(Some(organization))
            .into_iter()
            .map(|arcade| ArcadeSnapshot {
                machines: self
                    .machines
                    .for_arcade(arcade.id)
                    .iter()
                    .map(|m| MachineSnapshot {
                        category: m.category,
                        is_active: m.is_active,
                    })
                    .collect(),
                arcade: ArcadeRef {
                    id: arcade.id,
                    name: arcade.name,
                },
            })
            .collect())
    }
}
