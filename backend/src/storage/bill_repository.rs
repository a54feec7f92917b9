//! SQLite-backed bill storage.
//!
//! Listing, reporting and export all read bills through the same joined
//! query, so they share one ordering: year descending, month descending,
//! id descending (most recent first).

use shared::BillFilter;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::db::DbConnection;
use crate::domain::models::bill::{Bill, BillRow, NewBill};

const BILL_ROW_SELECT: &str =
    "SELECT b.id, b.tenant_id, b.month, b.year, b.start_reading, b.end_reading, \
     b.units, b.light_bill, b.total, b.paid, b.created_at, \
     t.name AS tenant_name, t.room, t.monthly_rent AS tenant_rent \
     FROM bills b JOIN tenants t ON t.id = b.tenant_id";

const BILL_ROW_ORDER: &str = " ORDER BY b.year DESC, b.month DESC, b.id DESC";

/// Storage adapter for the bills table.
#[derive(Clone)]
pub struct BillRepository {
    db: DbConnection,
}

impl BillRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a bill inside an open transaction and return its id. The caller
    /// commits together with the tenant cursor advance.
    pub async fn insert_in_tx(
        conn: &mut SqliteConnection,
        bill: &NewBill,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO bills (tenant_id, month, year, start_reading, end_reading, units, light_bill, total, paid, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(bill.tenant_id)
        .bind(bill.month)
        .bind(bill.year)
        .bind(bill.start_reading)
        .bind(bill.end_reading)
        .bind(bill.units)
        .bind(bill.light_bill)
        .bind(bill.total)
        .bind(bill.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Bills joined with their tenant, filtered by the optional month/year
    /// predicates, most recent first.
    pub async fn list(&self, filter: &BillFilter) -> Result<Vec<BillRow>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(BILL_ROW_SELECT);
        push_filter(&mut query, filter);
        query.push(BILL_ROW_ORDER);

        let rows = query.build().fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(bill_row_from_row).collect())
    }

    /// Unpaid bills only, same join and ordering as `list`.
    pub async fn list_unpaid(&self) -> Result<Vec<BillRow>, sqlx::Error> {
        let sql = format!("{} WHERE b.paid = 0{}", BILL_ROW_SELECT, BILL_ROW_ORDER);
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(bill_row_from_row).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Bill>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM bills WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| bill_from_row(&r)))
    }

    /// One bill joined with its tenant, the receipt read path.
    pub async fn find_row_by_id(&self, id: i64) -> Result<Option<BillRow>, sqlx::Error> {
        let sql = format!("{} WHERE b.id = ?", BILL_ROW_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| bill_row_from_row(&r)))
    }

    /// Set the paid flag. Setting it on an already-paid bill matches the row
    /// again, which is what makes the transition idempotent. Returns rows
    /// matched so an unknown id shows up as 0.
    pub async fn mark_paid(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE bills SET paid = 1 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &BillFilter) {
    let mut prefix = " WHERE ";
    if let Some(month) = filter.month {
        query.push(prefix).push("b.month = ").push_bind(month);
        prefix = " AND ";
    }
    if let Some(year) = filter.year {
        query.push(prefix).push("b.year = ").push_bind(year);
    }
}

fn bill_from_row(row: &SqliteRow) -> Bill {
    Bill {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        month: row.get("month"),
        year: row.get("year"),
        start_reading: row.get("start_reading"),
        end_reading: row.get("end_reading"),
        units: row.get("units"),
        light_bill: row.get("light_bill"),
        total: row.get("total"),
        paid: row.get("paid"),
        created_at: row.get("created_at"),
    }
}

fn bill_row_from_row(row: &SqliteRow) -> BillRow {
    BillRow {
        bill: bill_from_row(row),
        tenant_name: row.get("tenant_name"),
        room: row.get("room"),
        tenant_rent: row.get("tenant_rent"),
    }
}
