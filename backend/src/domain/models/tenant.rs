//! Domain model for a tenant.

use crate::error::LedgerError;
use chrono::{DateTime, Utc};

/// A tenant and their authoritative meter cursor.
///
/// `last_reading` always equals the `end_reading` of the tenant's most recent
/// bill, or the initial value set at creation if no bill exists yet. Only an
/// explicit tenant edit or a bill generation may move it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub room: Option<String>,
    pub monthly_rent: i64,
    pub rate_per_unit: f64,
    pub last_reading: i64,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn to_dto(&self) -> shared::Tenant {
        shared::Tenant {
            id: self.id,
            name: self.name.clone(),
            room: self.room.clone(),
            monthly_rent: self.monthly_rent,
            rate_per_unit: self.rate_per_unit,
            last_reading: self.last_reading,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// The writable tenant fields, shared by creation and full-replace update.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantFields {
    pub name: String,
    pub room: Option<String>,
    pub monthly_rent: i64,
    pub rate_per_unit: f64,
    pub last_reading: i64,
}

impl TenantFields {
    /// Validate the fields before they touch storage.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("tenant name is required"));
        }
        if self.monthly_rent <= 0 {
            return Err(LedgerError::validation("monthly rent must be positive"));
        }
        if self.rate_per_unit <= 0.0 {
            return Err(LedgerError::validation("rate per unit must be positive"));
        }
        if self.last_reading < 0 {
            return Err(LedgerError::validation("meter reading cannot be negative"));
        }
        Ok(())
    }
}
