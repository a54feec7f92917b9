//! Rent & light bill ledger backend.
//!
//! Tracks tenants and their meter cursors, generates rent + electricity
//! bills, records payments and serves filtered reports and CSV exports over
//! a small REST API.

pub mod db;
pub mod domain;
pub mod error;
pub mod rest;
pub mod storage;
