//! Inventory Manager
//!
//! Tracks in-house and outsourced parts and the products assembled from
//! them, stored in a local SQLite database.

pub mod cli;
pub mod core;
pub mod entities;
