//! Organization persistence operations on the `organizations` table.

use acm_core::OrganizationId;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::OrganizationRecord;

pub async fn insert(pool: &PgPool, record: &OrganizationRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO organizations (id, name, company_number, contact_email, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(*record.id.as_uuid())
    .bind(&record.name)
    .bind(&record.company_number)
    .bind(&record.contact_email)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all organizations on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<OrganizationRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrganizationRow>(
        "SELECT id, name, company_number, contact_email, created_at
         FROM organizations ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(OrganizationRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    company_number: Option<String>,
    contact_email: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_record(self) -> OrganizationRecord {
        OrganizationRecord {
            id: OrganizationId::from_uuid(self.id),
            name: self.name,
            company_number: self.company_number,
            contact_email: self.contact_email,
            created_at: self.created_at,
        }
    }
}
