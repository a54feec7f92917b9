//! Storage adapters over the SQLite pool.
//!
//! Each repository maps between table rows and the one domain value type for
//! that table. The bill-generation unit of work spans two tables, so the
//! repositories expose `_in_tx` variants that run against a caller-owned
//! transaction; everything else goes straight to the pool.

pub mod bill_repository;
pub mod tenant_repository;
pub mod user_repository;

pub use bill_repository::BillRepository;
pub use tenant_repository::TenantRepository;
pub use user_repository::UserRepository;
