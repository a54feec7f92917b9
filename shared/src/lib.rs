use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// A tenant as seen by API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    /// Optional room label ("2B", "Upstairs", ...)
    pub room: Option<String>,
    /// Fixed monthly rent in whole currency units
    pub monthly_rent: i64,
    /// Electricity rate per consumed unit
    pub rate_per_unit: f64,
    /// Latest recorded meter value; advanced by each generated bill
    pub last_reading: i64,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// A generated bill as seen by API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub tenant_id: i64,
    /// Billing period month (1-12), caller supplied
    pub month: u32,
    /// Billing period year, caller supplied
    pub year: i32,
    /// Meter value before this bill
    pub start_reading: i64,
    /// Meter value supplied at generation time
    pub end_reading: i64,
    /// end_reading - start_reading
    pub units: i64,
    /// Electricity charge, rounded to 2 decimal places
    pub light_bill: f64,
    /// monthly_rent + light_bill
    pub total: f64,
    pub paid: bool,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// A bill joined with its owning tenant's current display fields.
///
/// `tenant_rent` is the tenant's *current* monthly rent, which reports use
/// instead of the rent in effect when the bill was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRow {
    pub bill: Bill,
    pub tenant_name: String,
    pub room: Option<String>,
    pub tenant_rent: i64,
}

/// Aggregate totals over a filtered set of bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_units: i64,
    pub total_light: f64,
    pub total_rent: f64,
    pub grand_total: f64,
    pub received: f64,
    pub outstanding: f64,
}

/// Request for creating a new tenant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTenantRequest {
    pub name: String,
    pub room: Option<String>,
    pub monthly_rent: i64,
    /// Defaults to 8.0 when not provided
    pub rate_per_unit: Option<f64>,
    /// Initial meter reading, defaults to 0
    pub initial_reading: Option<i64>,
}

/// Request for replacing an existing tenant's fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateTenantRequest {
    pub name: String,
    pub room: Option<String>,
    pub monthly_rent: i64,
    pub rate_per_unit: f64,
    pub last_reading: i64,
}

/// Response after creating or updating a tenant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantResponse {
    pub tenant: Tenant,
    pub success_message: String,
}

/// Response containing a list of tenants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantListResponse {
    pub tenants: Vec<Tenant>,
}

/// Request for generating a bill from a new meter reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateBillRequest {
    pub tenant_id: i64,
    pub end_reading: i64,
    /// Billing period; defaults to the current month/year
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Response after generating a bill or marking one paid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillResponse {
    pub bill: Bill,
    pub success_message: String,
}

/// Response containing a filtered, ordered list of bills
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillListResponse {
    pub bills: Vec<BillRow>,
}

/// Optional month/year filter applied to listings, reports and exports.
/// Both predicates are independent and combined with AND.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BillFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Response for the report endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportResponse {
    /// Human-readable filter scope, e.g. "All Time" or "05/2025"
    pub scope: String,
    pub summary: Summary,
    pub bills: Vec<BillRow>,
}

/// Request for creating the first admin user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitAdminRequest {
    pub username: String,
    pub password: String,
}

/// Request for verifying a login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response after a successful auth operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user_id: i64,
    pub username: String,
    pub success_message: String,
}

/// The billing period a meter reading is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
}

impl BillingPeriod {
    /// The period for the current wall-clock month.
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.month(),
            year: now.year(),
        }
    }

    /// Months run 1-12; years are unconstrained.
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
    }

    /// Display form used across listings and receipts, e.g. "05/2025".
    pub fn label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}
