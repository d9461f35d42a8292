//! SQLite-backed inventory store
//!
//! This module owns the single database connection and hands out borrowed
//! repositories over it:
//! - [`PartRepository`] for the `parts` relation
//! - [`ProductRepository`] for `products` and the `product_parts` link rows
//!
//! Reads always hit the database; nothing is cached in memory.

mod discriminator;
mod parts;
mod products;
mod report;
mod schema;

pub use discriminator::{discriminate, PartRow, Variant};
pub use parts::PartRepository;
pub use products::ProductRepository;
pub use report::{ItemKind, ReportItem, StockLine};

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::core::error::{StoreError, StoreResult};
use crate::core::session::UserId;

/// Current schema version - opening a database with another version fails
const SCHEMA_VERSION: i32 = 1;

/// Characters with special meaning in a LIKE pattern
const WILDCARDS: [char; 2] = ['%', '_'];

/// The inventory store backed by SQLite
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path
    ///
    /// The schema is created on first open.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the schema if missing, otherwise check its version
    fn ensure_schema(&self) -> StoreResult<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get::<_, i64>(0).map(|n| n > 0),
        )?;

        if !has_version_table {
            return self.init_schema();
        }

        let found: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        if found != SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                found,
                expected: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    /// Repository over the `parts` relation
    pub fn parts(&self) -> PartRepository<'_> {
        PartRepository::new(&self.conn)
    }

    /// Repository over `products` and their part links
    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.conn)
    }

    /// Underlying connection, for direct SQL
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Creation and modification metadata of a stored row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTrail {
    pub created: DateTime<Utc>,
    pub created_by: UserId,
    pub last_updated: DateTime<Utc>,
    pub last_updated_by: UserId,
}

/// Read the audit columns of `table` for `id`
///
/// `table` is always one of our own relation names, never user input.
fn read_audit(conn: &Connection, table: &str, id: i64) -> StoreResult<Option<AuditTrail>> {
    let sql = format!(
        "SELECT create_date, created_by, last_updated, last_updated_by FROM {} WHERE id = ?1",
        table
    );
    let audit = conn
        .query_row(&sql, params![id], |row| {
            Ok(AuditTrail {
                created: parse_timestamp(row.get::<_, String>(0)?),
                created_by: UserId(row.get(1)?),
                last_updated: parse_timestamp(row.get::<_, String>(2)?),
                last_updated_by: UserId(row.get(3)?),
            })
        })
        .optional()?;
    Ok(audit)
}

/// Reject search text that would act as a LIKE wildcard
fn check_search_fragment(fragment: &str) -> StoreResult<()> {
    if fragment.contains(WILDCARDS) {
        return Err(StoreError::InvalidSearchInput {
            fragment: fragment.to_string(),
        });
    }
    Ok(())
}

/// Unicode-aware substring match; `needle` must already be lowercased
fn name_contains_folded(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// Format a timestamp the way it is stored (RFC 3339, whole seconds, `Z`)
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp
fn parse_timestamp(s: String) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            tracing::warn!(value = %s, "unparseable timestamp in database");
            DateTime::UNIX_EPOCH
        })
}

#[cfg(test)]
mod tests;
