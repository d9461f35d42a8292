//! Part repository - CRUD over the `parts` relation

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{
    check_search_fragment, format_timestamp, name_contains_folded, read_audit, AuditTrail, PartRow,
};
use crate::core::error::{StoreError, StoreResult};
use crate::core::session::Session;
use crate::entities::{Part, PartId, ProductId};

/// Borrowed view of the store for parts
pub struct PartRepository<'a> {
    conn: &'a Connection,
}

impl<'a> PartRepository<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new part and return it with its assigned id
    ///
    /// Any id already on `part` is ignored; storage assigns a fresh one.
    pub fn add(&self, part: &Part, session: &Session) -> StoreResult<Part> {
        let row = PartRow::from_part(part);
        let now = format_timestamp(&session.now);

        self.conn.execute(
            r#"INSERT INTO parts (name, price, stock, min, max, machine_id, company_name,
                                  create_date, created_by, last_updated, last_updated_by)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?8, ?9)"#,
            params![
                row.name,
                row.price,
                row.stock,
                row.min,
                row.max,
                row.machine_id,
                row.company_name,
                now,
                session.user_id.0,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(part_id = id, source = %part.source(), "added part");
        Ok(part.clone().with_id(id))
    }

    /// Load a part, or None if it is absent or its variant cannot be decided
    pub fn get(&self, id: PartId) -> StoreResult<Option<Part>> {
        match self.resolve(id) {
            Ok(part) => Ok(Some(part)),
            Err(StoreError::NotFound { .. }) => {
                debug!(part_id = id, "no part found");
                Ok(None)
            }
            Err(StoreError::IndeterminateVariant { .. }) => {
                warn!(
                    part_id = id,
                    "part is neither in-house nor outsourced; treating as not found"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Load a part, reporting why it could not be returned
    pub fn resolve(&self, id: PartId) -> StoreResult<Part> {
        self.row(id)?
            .ok_or(StoreError::NotFound { kind: "part", id })?
            .into_part()
            .ok_or(StoreError::IndeterminateVariant { id })
    }

    /// The stored row as-is, whatever its variant columns hold
    pub fn row(&self, id: PartId) -> StoreResult<Option<PartRow>> {
        let sql = format!("SELECT {} FROM parts WHERE id = ?1", PartRow::COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id], PartRow::from_row)
            .optional()?;
        Ok(row)
    }

    /// Parts whose name contains `fragment`
    ///
    /// `%` and `_` in the fragment are rejected before any query runs.
    /// Indeterminate rows are skipped.
    pub fn find_by_name_contains(
        &self,
        fragment: &str,
        case_insensitive: bool,
    ) -> StoreResult<Vec<Part>> {
        check_search_fragment(fragment)?;

        // SQLite only folds ASCII case, so case-insensitive matching happens here
        let rows = if case_insensitive {
            let sql = format!("SELECT {} FROM parts ORDER BY id", PartRow::COLUMNS);
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], PartRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            let needle = fragment.to_lowercase();
            rows.into_iter()
                .filter(|row| name_contains_folded(&row.name, &needle))
                .collect::<Vec<_>>()
        } else {
            let sql = format!(
                "SELECT {} FROM parts WHERE instr(name, ?1) > 0 ORDER BY id",
                PartRow::COLUMNS
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![fragment], PartRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        Ok(rows.into_iter().filter_map(discriminated).collect())
    }

    /// Look up by id when `text` is a number, otherwise search by name
    pub fn lookup(&self, text: &str) -> StoreResult<Vec<Part>> {
        let text = text.trim();
        match text.parse::<PartId>() {
            Ok(id) => Ok(self.get(id)?.into_iter().collect()),
            Err(_) => self.find_by_name_contains(text, true),
        }
    }

    /// Replace every field of a stored part
    ///
    /// The variant columns are written together, so switching variant
    /// clears the column of the old one in the same statement.
    pub fn update(&self, part: &Part, session: &Session) -> StoreResult<()> {
        let row = PartRow::from_part(part);

        let changed = self.conn.execute(
            r#"UPDATE parts
               SET name = ?1, price = ?2, stock = ?3, min = ?4, max = ?5,
                   machine_id = ?6, company_name = ?7,
                   last_updated = ?8, last_updated_by = ?9
               WHERE id = ?10"#,
            params![
                row.name,
                row.price,
                row.stock,
                row.min,
                row.max,
                row.machine_id,
                row.company_name,
                format_timestamp(&session.now),
                session.user_id.0,
                row.id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "part",
                id: row.id,
            });
        }

        debug!(part_id = row.id, source = %part.source(), "updated part");
        Ok(())
    }

    /// Delete a part that no product references
    ///
    /// Returns whether a row was removed. A referenced part is left intact
    /// and reported as a policy violation.
    pub fn delete(&self, id: PartId) -> StoreResult<bool> {
        let products = self.referenced_by(id)?;
        if !products.is_empty() {
            let ids: Vec<String> = products.iter().map(|p| p.to_string()).collect();
            return Err(StoreError::PolicyViolation {
                message: format!(
                    "part {} is used by {} product(s): {}. Remove it from them first.",
                    id,
                    products.len(),
                    ids.join(", ")
                ),
            });
        }

        let removed = self
            .conn
            .execute("DELETE FROM parts WHERE id = ?1", params![id])?;

        if removed > 0 {
            debug!(part_id = id, "deleted part");
        } else {
            debug!(part_id = id, "no part to delete");
        }
        Ok(removed > 0)
    }

    /// Products linking to this part (distinct, ascending)
    pub fn referenced_by(&self, id: PartId) -> StoreResult<Vec<ProductId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT product_id FROM product_parts WHERE part_id = ?1 ORDER BY product_id",
        )?;
        let ids = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<ProductId>>>()?;
        Ok(ids)
    }

    /// All resolvable parts, ordered by id
    pub fn list_all(&self) -> StoreResult<Vec<Part>> {
        let mut stmt = self.conn.prepare("SELECT id FROM parts ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<PartId>>>()?;

        let mut parts = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(part) = self.get(id)? {
                parts.push(part);
            }
        }
        Ok(parts)
    }

    /// Creation and modification metadata
    pub fn audit(&self, id: PartId) -> StoreResult<Option<AuditTrail>> {
        read_audit(self.conn, "parts", id)
    }
}

/// Resolve a row, logging and skipping indeterminate ones
fn discriminated(row: PartRow) -> Option<Part> {
    let id = row.id;
    let part = row.into_part();
    if part.is_none() {
        warn!(part_id = id, "skipping part that is neither in-house nor outsourced");
    }
    part
}
