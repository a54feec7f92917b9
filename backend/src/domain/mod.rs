//! Domain layer: models plus the services the REST surface calls into.

pub mod auth_service;
pub mod billing_service;
pub mod export_service;
pub mod models;
pub mod report_service;
pub mod tenant_service;

pub use auth_service::AuthService;
pub use billing_service::BillingService;
pub use export_service::{CsvExport, ExportService};
pub use report_service::ReportService;
pub use tenant_service::TenantService;
