//! Tenant management: creation, full-replace edit, lookup and listing.
//!
//! Tenants are never deleted; rent history would dangle otherwise.

use shared::{CreateTenantRequest, UpdateTenantRequest};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::models::tenant::{Tenant, TenantFields};
use crate::error::LedgerError;
use crate::storage::TenantRepository;

const DEFAULT_RATE_PER_UNIT: f64 = 8.0;

#[derive(Clone)]
pub struct TenantService {
    tenants: TenantRepository,
}

impl TenantService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            tenants: TenantRepository::new(db),
        }
    }

    pub async fn create_tenant(&self, request: CreateTenantRequest) -> Result<Tenant, LedgerError> {
        let fields = TenantFields {
            name: request.name.trim().to_string(),
            room: normalize_room(request.room),
            monthly_rent: request.monthly_rent,
            rate_per_unit: request.rate_per_unit.unwrap_or(DEFAULT_RATE_PER_UNIT),
            last_reading: request.initial_reading.unwrap_or(0),
        };
        fields.validate()?;

        let tenant = self.tenants.insert(&fields).await?;
        info!("Created tenant {} ({})", tenant.id, tenant.name);
        Ok(tenant)
    }

    /// Full replace of name, room, rent, rate and meter cursor. Editing the
    /// cursor here is the one mutation path besides bill generation.
    pub async fn update_tenant(
        &self,
        id: i64,
        request: UpdateTenantRequest,
    ) -> Result<Tenant, LedgerError> {
        let fields = TenantFields {
            name: request.name.trim().to_string(),
            room: normalize_room(request.room),
            monthly_rent: request.monthly_rent,
            rate_per_unit: request.rate_per_unit,
            last_reading: request.last_reading,
        };
        fields.validate()?;

        let matched = self.tenants.update(id, &fields).await?;
        if matched == 0 {
            return Err(LedgerError::TenantNotFound(id));
        }

        info!("Updated tenant {}", id);
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::TenantNotFound(id))
    }

    pub async fn get_tenant(&self, id: i64) -> Result<Tenant, LedgerError> {
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::TenantNotFound(id))
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, LedgerError> {
        Ok(self.tenants.list().await?)
    }
}

/// An empty or blank room field means "no room recorded".
fn normalize_room(room: Option<String>) -> Option<String> {
    room.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}
