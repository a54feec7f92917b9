//! Aggregate reporting over a filtered bill set.

use shared::{BillFilter, Summary};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::models::bill::BillRow;
use crate::error::LedgerError;
use crate::storage::BillRepository;

#[derive(Clone)]
pub struct ReportService {
    bills: BillRepository,
}

impl ReportService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            bills: BillRepository::new(db),
        }
    }

    /// Fold the filtered bills into summary totals, returning the rows too so
    /// the report view can show the detail table from the same read.
    ///
    /// `total_rent` sums each bill's tenant's rent as it stands *today*; a
    /// rent edit after billing shifts past reports. This matches how the
    /// ledger has always reported and is kept deliberately.
    pub async fn aggregate_report(
        &self,
        filter: &BillFilter,
    ) -> Result<(Summary, Vec<BillRow>), LedgerError> {
        let rows = self.bills.list(filter).await?;
        let summary = summarize(&rows);

        info!(
            "Report over {} bills ({}): grand total {:.2}, outstanding {:.2}",
            rows.len(),
            scope_label(filter),
            summary.grand_total,
            summary.outstanding
        );

        Ok((summary, rows))
    }
}

/// Fold a bill set into totals. `outstanding` is always derived as
/// `grand_total - received`, never summed independently.
pub fn summarize(rows: &[BillRow]) -> Summary {
    let mut summary = Summary {
        total_units: 0,
        total_light: 0.0,
        total_rent: 0.0,
        grand_total: 0.0,
        received: 0.0,
        outstanding: 0.0,
    };

    for row in rows {
        summary.total_units += row.bill.units;
        summary.total_light += row.bill.light_bill;
        summary.total_rent += row.tenant_rent as f64;
        summary.grand_total += row.bill.total;
        if row.bill.paid {
            summary.received += row.bill.total;
        }
    }

    summary.outstanding = summary.grand_total - summary.received;
    summary
}

/// Human-readable description of the filter scope, e.g. "All Time",
/// "Year 2025", "05/2025" or "Month 5".
pub fn scope_label(filter: &BillFilter) -> String {
    match (filter.month, filter.year) {
        (None, None) => "All Time".to_string(),
        (None, Some(year)) => format!("Year {}", year),
        (Some(month), Some(year)) => format!("{:02}/{}", month, year),
        (Some(month), None) => format!("Month {}", month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing_service::BillingService;
    use crate::domain::tenant_service::TenantService;
    use shared::{BillingPeriod, CreateTenantRequest};

    async fn setup() -> (TenantService, BillingService, ReportService) {
        let db = DbConnection::init_test().await.expect("test db");
        (
            TenantService::new(db.clone()),
            BillingService::new(db.clone()),
            ReportService::new(db),
        )
    }

    async fn seed_tenant(tenants: &TenantService, name: &str, rent: i64, reading: i64) -> i64 {
        tenants
            .create_tenant(CreateTenantRequest {
                name: name.to_string(),
                room: None,
                monthly_rent: rent,
                rate_per_unit: Some(8.0),
                initial_reading: Some(reading),
            })
            .await
            .expect("seed tenant")
            .id
    }

    #[tokio::test]
    async fn test_two_bill_aggregate_scenario() {
        let (tenants, billing, reports) = setup().await;

        // 5000 rent + 50 units @ 8.0 = 5400, paid
        let first = seed_tenant(&tenants, "Asha", 5000, 100).await;
        let paid = billing
            .generate_bill(first, 150, BillingPeriod { month: 5, year: 2025 })
            .await
            .unwrap();
        billing.mark_paid(paid.id).await.unwrap();

        // 3000 rent + 25 units @ 8.0 = 3200, unpaid
        let second = seed_tenant(&tenants, "Ravi", 3000, 0).await;
        billing
            .generate_bill(second, 25, BillingPeriod { month: 5, year: 2025 })
            .await
            .unwrap();

        let (summary, rows) = reports
            .aggregate_report(&BillFilter::default())
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(summary.total_units, 75);
        assert_eq!(summary.total_light, 600.0);
        assert_eq!(summary.total_rent, 8000.0);
        assert_eq!(summary.grand_total, 8600.0);
        assert_eq!(summary.received, 5400.0);
        assert_eq!(summary.outstanding, 3200.0);
    }

    #[tokio::test]
    async fn test_outstanding_identity_holds() {
        let (tenants, billing, reports) = setup().await;
        let tenant = seed_tenant(&tenants, "Asha", 5000, 0).await;

        for (end, month) in [(10, 1), (30, 2), (55, 3)] {
            let bill = billing
                .generate_bill(tenant, end, BillingPeriod { month, year: 2025 })
                .await
                .unwrap();
            if month != 2 {
                billing.mark_paid(bill.id).await.unwrap();
            }
        }

        let (summary, _) = reports
            .aggregate_report(&BillFilter::default())
            .await
            .unwrap();

        assert_eq!(summary.outstanding, summary.grand_total - summary.received);
        assert!(summary.received <= summary.grand_total);
    }

    #[tokio::test]
    async fn test_filter_by_month_and_year() {
        let (tenants, billing, reports) = setup().await;
        let tenant = seed_tenant(&tenants, "Asha", 5000, 0).await;

        billing
            .generate_bill(tenant, 10, BillingPeriod { month: 4, year: 2024 })
            .await
            .unwrap();
        billing
            .generate_bill(tenant, 20, BillingPeriod { month: 5, year: 2025 })
            .await
            .unwrap();
        billing
            .generate_bill(tenant, 30, BillingPeriod { month: 4, year: 2025 })
            .await
            .unwrap();

        let (_, april_rows) = reports
            .aggregate_report(&BillFilter { month: Some(4), year: None })
            .await
            .unwrap();
        assert_eq!(april_rows.len(), 2);

        let (_, april_2025_rows) = reports
            .aggregate_report(&BillFilter { month: Some(4), year: Some(2025) })
            .await
            .unwrap();
        assert_eq!(april_2025_rows.len(), 1);
        assert_eq!(april_2025_rows[0].bill.year, 2025);

        let (summary_2024, rows_2024) = reports
            .aggregate_report(&BillFilter { month: None, year: Some(2024) })
            .await
            .unwrap();
        assert_eq!(rows_2024.len(), 1);
        assert_eq!(summary_2024.total_units, 10);
    }

    #[tokio::test]
    async fn test_report_uses_current_rent_not_billed_rent() {
        let (tenants, billing, reports) = setup().await;
        let tenant = seed_tenant(&tenants, "Asha", 5000, 100).await;

        let bill = billing
            .generate_bill(tenant, 150, BillingPeriod { month: 5, year: 2025 })
            .await
            .unwrap();
        assert_eq!(bill.total, 5400.0);

        // Raise the rent after billing; the bill total is locked but the
        // report's rent column follows the tenant.
        tenants
            .update_tenant(
                tenant,
                shared::UpdateTenantRequest {
                    name: "Asha".to_string(),
                    room: None,
                    monthly_rent: 6000,
                    rate_per_unit: 8.0,
                    last_reading: 150,
                },
            )
            .await
            .unwrap();

        let (summary, _) = reports
            .aggregate_report(&BillFilter::default())
            .await
            .unwrap();
        assert_eq!(summary.total_rent, 6000.0);
        assert_eq!(summary.grand_total, 5400.0);
    }

    #[tokio::test]
    async fn test_listing_order_is_year_month_id_descending() {
        let (tenants, billing, _) = setup().await;
        let tenant = seed_tenant(&tenants, "Asha", 5000, 0).await;

        billing
            .generate_bill(tenant, 10, BillingPeriod { month: 12, year: 2024 })
            .await
            .unwrap();
        billing
            .generate_bill(tenant, 20, BillingPeriod { month: 1, year: 2025 })
            .await
            .unwrap();
        billing
            .generate_bill(tenant, 30, BillingPeriod { month: 1, year: 2025 })
            .await
            .unwrap();
        billing
            .generate_bill(tenant, 40, BillingPeriod { month: 3, year: 2025 })
            .await
            .unwrap();

        let bills = billing.list_bills(&BillFilter::default()).await.unwrap();
        let periods: Vec<(i32, u32)> = bills
            .iter()
            .map(|r| (r.bill.year, r.bill.month))
            .collect();
        assert_eq!(
            periods,
            vec![(2025, 3), (2025, 1), (2025, 1), (2024, 12)]
        );

        // Within the same period the newer bill (higher id) comes first
        assert!(bills[1].bill.id > bills[2].bill.id);

        // Stable under repeated calls
        let again = billing.list_bills(&BillFilter::default()).await.unwrap();
        let ids: Vec<i64> = bills.iter().map(|r| r.bill.id).collect();
        let ids_again: Vec<i64> = again.iter().map(|r| r.bill.id).collect();
        assert_eq!(ids, ids_again);
    }

    #[tokio::test]
    async fn test_empty_report() {
        let (_, _, reports) = setup().await;
        let (summary, rows) = reports
            .aggregate_report(&BillFilter::default())
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(summary.total_units, 0);
        assert_eq!(summary.grand_total, 0.0);
        assert_eq!(summary.outstanding, 0.0);
    }

    #[test]
    fn test_scope_labels() {
        assert_eq!(scope_label(&BillFilter::default()), "All Time");
        assert_eq!(
            scope_label(&BillFilter { month: None, year: Some(2025) }),
            "Year 2025"
        );
        assert_eq!(
            scope_label(&BillFilter { month: Some(5), year: Some(2025) }),
            "05/2025"
        );
        assert_eq!(
            scope_label(&BillFilter { month: Some(5), year: None }),
            "Month 5"
        );
    }
}
