//! Arcade persistence operations on the `arcades` table.
//!
//! Declared machine counts are stored as `INTEGER` columns; they are the
//! setup-time declaration only and play no part in live compliance.

use acm_core::{ArcadeId, OrganizationId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{decode_error, encode_error};
use crate::state::{ArcadeRecord, DeclaredMachines};

const COLUMNS: &str = "id, organization_id, name, address, city, postcode, country, \
     premises_license_no, local_authority, opening_hours, contact_phone, contact_email, \
     category_b3_machines, category_c_machines, category_d_machines, other_machines, \
     created_at, updated_at";

/// Convert a declared count for an `INTEGER` column.
fn count_column(column: &str, value: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|_| encode_error(format!("{column} out of range ({value})")))
}

pub async fn insert(pool: &PgPool, record: &ArcadeRecord) -> Result<(), sqlx::Error> {
    let declared = &record.declared_machines;
    let b3 = count_column("category_b3_machines", declared.category_b3_machines)?;
    let c = count_column("category_c_machines", declared.category_c_machines)?;
    let d = count_column("category_d_machines", declared.category_d_machines)?;
    let other = count_column("other_machines", declared.other_machines)?;
    sqlx::query(&format!(
        "INSERT INTO arcades ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
    ))
    .bind(*record.id.as_uuid())
    .bind(*record.organization_id.as_uuid())
    .bind(&record.name)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.postcode)
    .bind(&record.country)
    .bind(&record.premises_license_no)
    .bind(&record.local_authority)
    .bind(&record.opening_hours)
    .bind(&record.contact_phone)
    .bind(&record.contact_email)
    .bind(b3)
    .bind(c)
    .bind(d)
    .bind(other)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all arcades on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ArcadeRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ArcadeRow>(&format!(
        "SELECT {COLUMNS} FROM arcades ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ArcadeRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct ArcadeRow {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    address: String,
    city: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    premises_license_no: Option<String>,
    local_authority: Option<String>,
    opening_hours: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    category_b3_machines: i32,
    category_c_machines: i32,
    category_d_machines: i32,
    other_machines: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn count(id: Uuid, column: &str, value: i32) -> Result<u32, sqlx::Error> {
    u32::try_from(value)
        .map_err(|_| decode_error(format!("arcade {id}: negative {column} ({value})")))
}

impl ArcadeRow {
    fn into_record(self) -> Result<ArcadeRecord, sqlx::Error> {
        let declared_machines = DeclaredMachines {
            category_b3_machines: count(self.id, "category_b3_machines", self.category_b3_machines)?,
            category_c_machines: count(self.id, "category_c_machines", self.category_c_machines)?,
            category_d_machines: count(self.id, "category_d_machines", self.category_d_machines)?,
            other_machines: count(self.id, "other_machines", self.other_machines)?,
        };
        Ok(ArcadeRecord {
            id: ArcadeId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            name: self.name,
            address: self.address,
            city: self.city,
            postcode: self.postcode,
            country: self.country,
            premises_license_no: self.premises_license_no,
            local_authority: self.local_authority,
            opening_hours: self.opening_hours,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            declared_machines,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
