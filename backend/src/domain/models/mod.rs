pub mod bill;
pub mod tenant;
pub mod user;
