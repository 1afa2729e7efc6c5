//! Machine persistence operations on the `machines` table.
//!
//! Serial uniqueness is enforced by the `machines_serial_number_key`
//! constraint; callers map the violation to a conflict.

use acm_core::{ArcadeId, MachineCategory, MachineId, SerialNumber};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;
use crate::state::MachineRecord;

pub async fn insert(pool: &PgPool, record: &MachineRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO machines (id, arcade_id, serial_number, manufacturer, model, category,
                               install_date, location, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(*record.id.as_uuid())
    .bind(*record.arcade_id.as_uuid())
    .bind(record.serial_number.as_str())
    .bind(&record.manufacturer)
    .bind(&record.model)
    .bind(record.category.as_str())
    .bind(record.install_date)
    .bind(&record.location)
    .bind(record.is_active)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite the mutable columns of a machine. Returns whether a row matched.
pub async fn update(pool: &PgPool, record: &MachineRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE machines SET serial_number = $1, manufacturer = $2, model = $3, category = $4,
                             install_date = $5, location = $6, is_active = $7, updated_at = $8
         WHERE id = $9",
    )
    .bind(record.serial_number.as_str())
    .bind(&record.manufacturer)
    .bind(&record.model)
    .bind(record.category.as_str())
    .bind(record.install_date)
    .bind(&record.location)
    .bind(record.is_active)
    .bind(record.updated_at)
    .bind(*record.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: MachineId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM machines WHERE id = $1")
        .bind(*id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all machines on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<MachineRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MachineRow>(
        "SELECT id, arcade_id, serial_number, manufacturer, model, category,
                install_date, location, is_active, created_at, updated_at
         FROM machines ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MachineRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct MachineRow {
    id: Uuid,
    arcade_id: Uuid,
    serial_number: String,
    manufacturer: Option<String>,
    model: Option<String>,
    category: String,
    install_date: Option<NaiveDate>,
    location: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MachineRow {
    fn into_record(self) -> Result<MachineRecord, sqlx::Error> {
        let serial_number = SerialNumber::new(self.serial_number)
            .map_err(|e| decode_error(format!("machine {}: {e}", self.id)))?;
        // The column CHECK admits only known tags; anything else is kept
        // countable rather than dropped.
        let category = self.category.parse().unwrap_or_else(|e| {
            tracing::error!(id = %self.id, error = %e, "unknown machine category in database");
            MachineCategory::Other
        });

        Ok(MachineRecord {
            id: MachineId::from_uuid(self.id),
            arcade_id: ArcadeId::from_uuid(self.arcade_id),
            serial_number,
            manufacturer: self.manufacturer,
            model: self.model,
            category,
            install_date: self.install_date,
            location: self.location,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
