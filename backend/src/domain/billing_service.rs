//! Bill generation and the payment transition.
//!
//! Generating a bill is the one place where two tables move together: the
//! new bill row and the tenant's meter cursor are written inside a single
//! transaction, so a failure on either side leaves both untouched and two
//! generations against the same tenant cannot read the same stale cursor.

use chrono::Utc;
use shared::BillingPeriod;
use tracing::info;

use crate::db::DbConnection;
use crate::domain::models::bill::{light_bill, Bill, BillRow, NewBill};
use crate::error::LedgerError;
use crate::storage::{BillRepository, TenantRepository};

#[derive(Clone)]
pub struct BillingService {
    db: DbConnection,
    bills: BillRepository,
}

impl BillingService {
    pub fn new(db: DbConnection) -> Self {
        let bills = BillRepository::new(db.clone());
        Self { db, bills }
    }

    /// Generate a bill for a tenant from a new end-of-period meter reading.
    ///
    /// The computation is fixed: `units = end_reading - start_reading`,
    /// `light_bill = round2(units * rate_per_unit)`,
    /// `total = monthly_rent + light_bill`, where `start_reading` is the
    /// tenant's cursor at the time of the read. The cursor advances to
    /// `end_reading` in the same commit that stores the bill.
    pub async fn generate_bill(
        &self,
        tenant_id: i64,
        end_reading: i64,
        period: BillingPeriod,
    ) -> Result<Bill, LedgerError> {
        if !period.is_valid() {
            return Err(LedgerError::validation(format!(
                "month must be between 1 and 12, got {}",
                period.month
            )));
        }
        if end_reading < 0 {
            return Err(LedgerError::validation("end reading cannot be negative"));
        }

        let mut tx = self.db.pool().begin().await?;

        let tenant = TenantRepository::find_by_id_in_tx(&mut tx, tenant_id)
            .await?
            .ok_or(LedgerError::TenantNotFound(tenant_id))?;

        let start_reading = tenant.last_reading;
        if end_reading < start_reading {
            // Dropping the transaction rolls back; nothing was written.
            return Err(LedgerError::InvalidReading {
                last_reading: start_reading,
                end_reading,
            });
        }

        let units = end_reading - start_reading;
        let light_bill = light_bill(units, tenant.rate_per_unit);
        let total = tenant.monthly_rent as f64 + light_bill;
        let created_at = Utc::now();

        let new_bill = NewBill {
            tenant_id,
            month: period.month,
            year: period.year,
            start_reading,
            end_reading,
            units,
            light_bill,
            total,
            created_at,
        };

        let bill_id = BillRepository::insert_in_tx(&mut tx, &new_bill).await?;
        TenantRepository::advance_cursor_in_tx(&mut tx, tenant_id, end_reading).await?;
        tx.commit().await?;

        info!(
            "Generated bill {} for tenant {}: {} units, light {:.2}, total {:.2}",
            bill_id, tenant_id, units, light_bill, total
        );

        Ok(Bill {
            id: bill_id,
            tenant_id,
            month: period.month,
            year: period.year,
            start_reading,
            end_reading,
            units,
            light_bill,
            total,
            paid: false,
            created_at,
        })
    }

    /// One-way payment transition. Marking an already-paid bill paid again is
    /// a no-op, not an error; there is no way back to unpaid.
    pub async fn mark_paid(&self, bill_id: i64) -> Result<Bill, LedgerError> {
        let matched = self.bills.mark_paid(bill_id).await?;
        if matched == 0 {
            return Err(LedgerError::BillNotFound(bill_id));
        }

        info!("Marked bill {} paid", bill_id);
        self.bills
            .find_by_id(bill_id)
            .await?
            .ok_or(LedgerError::BillNotFound(bill_id))
    }

    /// One bill with its tenant's display fields, for receipts.
    pub async fn get_bill(&self, bill_id: i64) -> Result<BillRow, LedgerError> {
        self.bills
            .find_row_by_id(bill_id)
            .await?
            .ok_or(LedgerError::BillNotFound(bill_id))
    }

    pub async fn list_bills(&self, filter: &shared::BillFilter) -> Result<Vec<BillRow>, LedgerError> {
        Ok(self.bills.list(filter).await?)
    }

    pub async fn list_unpaid(&self) -> Result<Vec<BillRow>, LedgerError> {
        Ok(self.bills.list_unpaid().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tenant_service::TenantService;
    use shared::{BillFilter, CreateTenantRequest};

    async fn setup() -> (TenantService, BillingService) {
        let db = DbConnection::init_test().await.expect("test db");
        (TenantService::new(db.clone()), BillingService::new(db))
    }

    async fn seed_tenant(tenants: &TenantService) -> i64 {
        tenants
            .create_tenant(CreateTenantRequest {
                name: "Asha".to_string(),
                room: Some("2B".to_string()),
                monthly_rent: 5000,
                rate_per_unit: Some(8.0),
                initial_reading: Some(100),
            })
            .await
            .expect("seed tenant")
            .id
    }

    fn period(month: u32, year: i32) -> BillingPeriod {
        BillingPeriod { month, year }
    }

    #[tokio::test]
    async fn test_generate_bill_computes_charges_and_advances_cursor() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;

        let bill = billing
            .generate_bill(tenant_id, 150, period(5, 2025))
            .await
            .unwrap();

        assert_eq!(bill.start_reading, 100);
        assert_eq!(bill.end_reading, 150);
        assert_eq!(bill.units, 50);
        assert_eq!(bill.light_bill, 400.0);
        assert_eq!(bill.total, 5400.0);
        assert!(!bill.paid);

        let tenant = tenants.get_tenant(tenant_id).await.unwrap();
        assert_eq!(tenant.last_reading, 150);
    }

    #[tokio::test]
    async fn test_generate_bill_with_equal_reading_yields_zero_units() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;

        let bill = billing
            .generate_bill(tenant_id, 100, period(5, 2025))
            .await
            .unwrap();

        assert_eq!(bill.units, 0);
        assert_eq!(bill.light_bill, 0.0);
        assert_eq!(bill.total, 5000.0);
    }

    #[tokio::test]
    async fn test_stale_reading_fails_and_mutates_nothing() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;

        billing
            .generate_bill(tenant_id, 150, period(5, 2025))
            .await
            .unwrap();

        let result = billing.generate_bill(tenant_id, 140, period(6, 2025)).await;
        assert!(matches!(
            result,
            Err(LedgerError::InvalidReading { last_reading: 150, end_reading: 140 })
        ));

        // Cursor unchanged, no second bill stored
        let tenant = tenants.get_tenant(tenant_id).await.unwrap();
        assert_eq!(tenant.last_reading, 150);
        let bills = billing.list_bills(&BillFilter::default()).await.unwrap();
        assert_eq!(bills.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_bill_for_missing_tenant() {
        let (_, billing) = setup().await;

        let result = billing.generate_bill(99, 150, period(5, 2025)).await;
        assert!(matches!(result, Err(LedgerError::TenantNotFound(99))));
    }

    #[tokio::test]
    async fn test_generate_bill_rejects_bad_month() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;

        let result = billing.generate_bill(tenant_id, 150, period(13, 2025)).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));

        let result = billing.generate_bill(tenant_id, 150, period(0, 2025)).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_fractional_rate_rounds_to_two_decimals() {
        let (tenants, billing) = setup().await;
        let tenant_id = tenants
            .create_tenant(CreateTenantRequest {
                name: "Ravi".to_string(),
                room: None,
                monthly_rent: 3000,
                rate_per_unit: Some(7.33),
                initial_reading: Some(0),
            })
            .await
            .unwrap()
            .id;

        let bill = billing
            .generate_bill(tenant_id, 7, period(1, 2025))
            .await
            .unwrap();

        assert_eq!(bill.units, 7);
        assert_eq!(bill.light_bill, 51.31);
        assert!((bill.total - 3051.31).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_consecutive_bills_chain_cursor_readings() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;

        let first = billing
            .generate_bill(tenant_id, 150, period(5, 2025))
            .await
            .unwrap();
        let second = billing
            .generate_bill(tenant_id, 180, period(6, 2025))
            .await
            .unwrap();

        assert_eq!(first.end_reading, second.start_reading);
        assert_eq!(second.units, 30);
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;
        let bill = billing
            .generate_bill(tenant_id, 150, period(5, 2025))
            .await
            .unwrap();

        let once = billing.mark_paid(bill.id).await.unwrap();
        assert!(once.paid);

        let twice = billing.mark_paid(bill.id).await.unwrap();
        assert!(twice.paid);
        assert_eq!(once.id, twice.id);
    }

    #[tokio::test]
    async fn test_mark_paid_unknown_bill() {
        let (_, billing) = setup().await;
        let result = billing.mark_paid(12345).await;
        assert!(matches!(result, Err(LedgerError::BillNotFound(12345))));
    }

    #[tokio::test]
    async fn test_get_bill_includes_tenant_fields() {
        let (tenants, billing) = setup().await;
        let tenant_id = seed_tenant(&tenants).await;
        let bill = billing
            .generate_bill(tenant_id, 150, period(5, 2025))
            .await
            .unwrap();

        let row = billing.get_bill(bill.id).await.unwrap();
        assert_eq!(row.tenant_name, "Asha");
        assert_eq!(row.room.as_deref(), Some("2B"));
        assert_eq!(row.tenant_rent, 5000);
    }
}
