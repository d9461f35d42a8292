//! Product repository - CRUD over `products` and the `product_parts` links

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::{
    check_search_fragment, format_timestamp, name_contains_folded, read_audit, AuditTrail,
    PartRepository,
};
use crate::core::error::{StoreError, StoreResult};
use crate::core::reconcile::{self, AssociationDiff};
use crate::core::session::Session;
use crate::entities::{PartId, PartRef, Product, ProductId};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, min, max";

/// Borrowed view of the store for products
pub struct ProductRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ProductRepository<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parts(&self) -> PartRepository<'a> {
        PartRepository::new(self.conn)
    }

    /// Insert a product and one link row per associated part
    ///
    /// Repeated parts get one link each. The product row and its links are
    /// written in one transaction.
    pub fn add(&self, product: &Product, session: &Session) -> StoreResult<Product> {
        let tx = self.conn.unchecked_transaction()?;
        let now = format_timestamp(&session.now);

        tx.execute(
            r#"INSERT INTO products (name, price, stock, min, max,
                                     create_date, created_by, last_updated, last_updated_by)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6, ?7)"#,
            params![
                product.name,
                product.price,
                product.stock,
                product.min,
                product.max,
                now,
                session.user_id.0,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for part in &product.associated_parts {
            insert_link(&tx, id, part.part_ref())?;
        }

        tx.commit()?;

        debug!(
            product_id = id,
            links = product.associated_parts.len(),
            "added product"
        );

        let mut stored = product.clone();
        stored.id = id;
        Ok(stored)
    }

    /// Load a product with its associated parts, or None if absent
    ///
    /// Linked parts whose variant cannot be decided are left out of the list.
    pub fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        match self.resolve(id) {
            Ok(product) => Ok(Some(product)),
            Err(StoreError::NotFound { .. }) => {
                debug!(product_id = id, "no product found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Load a product, failing with NotFound if absent
    pub fn resolve(&self, id: ProductId) -> StoreResult<Product> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let mut product = self
            .conn
            .query_row(&sql, params![id], product_from_row)
            .optional()?
            .ok_or(StoreError::NotFound {
                kind: "product",
                id,
            })?;

        self.load_parts(&mut product)?;
        Ok(product)
    }

    fn load_parts(&self, product: &mut Product) -> StoreResult<()> {
        let parts = self.parts();
        for link in self.linked_parts(product.id)? {
            match parts.get(link.id())? {
                Some(part) => product.associated_parts.push(part),
                None => warn!(
                    product_id = product.id,
                    part_id = link.id(),
                    "dropping unresolvable linked part"
                ),
            }
        }
        Ok(())
    }

    /// The persisted link multiset for a product, oldest link first
    pub fn linked_parts(&self, id: ProductId) -> StoreResult<Vec<PartRef>> {
        let mut stmt = self
            .conn
            .prepare("SELECT part_id FROM product_parts WHERE product_id = ?1 ORDER BY link_id")?;
        let refs = stmt
            .query_map(params![id], |row| row.get(0).map(PartRef))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(refs)
    }

    /// Products whose name contains `fragment`, with their parts
    pub fn find_by_name_contains(
        &self,
        fragment: &str,
        case_insensitive: bool,
    ) -> StoreResult<Vec<Product>> {
        check_search_fragment(fragment)?;

        let mut products = if case_insensitive {
            let sql = format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS);
            let mut stmt = self.conn.prepare(&sql)?;
            let products = stmt
                .query_map([], product_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            let needle = fragment.to_lowercase();
            products
                .into_iter()
                .filter(|product| name_contains_folded(&product.name, &needle))
                .collect::<Vec<_>>()
        } else {
            let sql = format!(
                "SELECT {} FROM products WHERE instr(name, ?1) > 0 ORDER BY id",
                PRODUCT_COLUMNS
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let products = stmt
                .query_map(params![fragment], product_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            products
        };

        for product in &mut products {
            self.load_parts(product)?;
        }
        Ok(products)
    }

    /// Look up by id when `text` is a number, otherwise search by name
    pub fn lookup(&self, text: &str) -> StoreResult<Vec<Product>> {
        let text = text.trim();
        match text.parse::<ProductId>() {
            Ok(id) => Ok(self.get(id)?.into_iter().collect()),
            Err(_) => self.find_by_name_contains(text, true),
        }
    }

    /// Replace a product's fields and reconcile its part links
    ///
    /// The persisted links are diffed against `product.associated_parts`
    /// and only the differing occurrences are written: removals first, then
    /// additions. When a part is linked several times, the oldest link row
    /// is removed first. Everything runs in one transaction, so a failure
    /// leaves the product as it was.
    pub fn update(&self, product: &Product, session: &Session) -> StoreResult<AssociationDiff> {
        let tx = self.conn.unchecked_transaction()?;

        let changed = tx.execute(
            r#"UPDATE products
               SET name = ?1, price = ?2, stock = ?3, min = ?4, max = ?5,
                   last_updated = ?6, last_updated_by = ?7
               WHERE id = ?8"#,
            params![
                product.name,
                product.price,
                product.stock,
                product.min,
                product.max,
                format_timestamp(&session.now),
                session.user_id.0,
                product.id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "product",
                id: product.id,
            });
        }

        let current = self.linked_parts(product.id)?;
        let edits = reconcile::diff(&current, &product.part_refs());

        if edits.is_empty() {
            debug!(product_id = product.id, "associated parts unchanged");
        } else {
            for part in &edits.to_remove {
                remove_link(&tx, product.id, *part)?;
            }
            for part in &edits.to_add {
                insert_link(&tx, product.id, *part)?;
            }
            info!(
                product_id = product.id,
                removed = edits.to_remove.len(),
                added = edits.to_add.len(),
                "reconciled associated parts"
            );
        }

        tx.commit()?;
        Ok(edits)
    }

    /// Delete a product that has no associated parts
    ///
    /// Returns whether a row was removed.
    pub fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let links = self.linked_parts(id)?;
        if !links.is_empty() {
            return Err(StoreError::PolicyViolation {
                message: format!(
                    "product {} still has {} associated part(s). Remove them first.",
                    id,
                    links.len()
                ),
            });
        }

        let deleted = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?
            > 0;
        debug!(product_id = id, deleted, "delete product");
        Ok(deleted)
    }

    /// All products, ordered by id
    pub fn list_all(&self) -> StoreResult<Vec<Product>> {
        let mut stmt = self.conn.prepare("SELECT id FROM products ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<ProductId>>>()?;

        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.get(id)? {
                products.push(product);
            }
        }
        Ok(products)
    }

    /// Products that link to the given part
    pub fn using_part(&self, part_id: PartId) -> StoreResult<Vec<Product>> {
        let mut products = Vec::new();
        for id in self.parts().referenced_by(part_id)? {
            if let Some(product) = self.get(id)? {
                products.push(product);
            }
        }
        Ok(products)
    }

    /// Creation and modification metadata
    pub fn audit(&self, id: ProductId) -> StoreResult<Option<AuditTrail>> {
        read_audit(self.conn, "products", id)
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        stock: row.get(3)?,
        min: row.get(4)?,
        max: row.get(5)?,
        associated_parts: Vec::new(),
    })
}

fn insert_link(conn: &Connection, product_id: ProductId, part: PartRef) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO product_parts (product_id, part_id) VALUES (?1, ?2)",
        params![product_id, part.id()],
    )?;
    debug!(product_id, part_id = part.id(), "linked part");
    Ok(())
}

/// Remove one occurrence of a link, the one with the lowest link_id
fn remove_link(conn: &Connection, product_id: ProductId, part: PartRef) -> StoreResult<()> {
    let removed = conn.execute(
        r#"DELETE FROM product_parts
           WHERE link_id = (SELECT MIN(link_id) FROM product_parts
                            WHERE product_id = ?1 AND part_id = ?2)"#,
        params![product_id, part.id()],
    )?;
    if removed == 0 {
        warn!(product_id, part_id = part.id(), "no link left to remove");
    } else {
        debug!(product_id, part_id = part.id(), "unlinked part");
    }
    Ok(())
}
