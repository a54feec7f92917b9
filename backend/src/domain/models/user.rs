//! Domain model for an admin user.

use chrono::{DateTime, Utc};

/// An admin account; the ledger only ever holds a handful of these.
/// The password is stored as an Argon2 PHC-format hash, never in clear.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
