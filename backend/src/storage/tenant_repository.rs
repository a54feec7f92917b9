//! SQLite-backed tenant storage.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;
use crate::domain::models::tenant::{Tenant, TenantFields};

/// Storage adapter for the tenants table. All reads and writes go through
/// the one `Tenant` value type; callers never see raw rows.
#[derive(Clone)]
pub struct TenantRepository {
    db: DbConnection,
}

impl TenantRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a new tenant and return the stored record.
    pub async fn insert(&self, fields: &TenantFields) -> Result<Tenant, sqlx::Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tenants (name, room, monthly_rent, rate_per_unit, last_reading, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&fields.name)
        .bind(&fields.room)
        .bind(fields.monthly_rent)
        .bind(fields.rate_per_unit)
        .bind(fields.last_reading)
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        Ok(Tenant {
            id: result.last_insert_rowid(),
            name: fields.name.clone(),
            room: fields.room.clone(),
            monthly_rent: fields.monthly_rent,
            rate_per_unit: fields.rate_per_unit,
            last_reading: fields.last_reading,
            created_at,
        })
    }

    /// Full replace of a tenant's mutable fields. Returns the number of rows
    /// matched, so a missing tenant shows up as 0.
    pub async fn update(&self, id: i64, fields: &TenantFields) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tenants SET name = ?, room = ?, monthly_rent = ?, rate_per_unit = ?, last_reading = ? \
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.room)
        .bind(fields.monthly_rent)
        .bind(fields.rate_per_unit)
        .bind(fields.last_reading)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| tenant_from_row(&r)))
    }

    /// All tenants ordered by name, as the tenant listing shows them.
    pub async fn list(&self) -> Result<Vec<Tenant>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.iter().map(tenant_from_row).collect())
    }

    /// Read a tenant inside an open transaction. Bill generation uses this so
    /// the cursor it reads stays authoritative until the commit.
    pub async fn find_by_id_in_tx(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(|r| tenant_from_row(&r)))
    }

    /// Advance the meter cursor inside the same transaction that inserts the
    /// corresponding bill.
    pub async fn advance_cursor_in_tx(
        conn: &mut SqliteConnection,
        id: i64,
        last_reading: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tenants SET last_reading = ? WHERE id = ?")
            .bind(last_reading)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

fn tenant_from_row(row: &SqliteRow) -> Tenant {
    Tenant {
        id: row.get("id"),
        name: row.get("name"),
        room: row.get("room"),
        monthly_rent: row.get("monthly_rent"),
        rate_per_unit: row.get("rate_per_unit"),
        last_reading: row.get("last_reading"),
        created_at: row.get("created_at"),
    }
}
