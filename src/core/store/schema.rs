//! Database schema initialization

use rusqlite::params;

use super::{Store, SCHEMA_VERSION};
use crate::core::error::StoreResult;

impl Store {
    /// Initialize database schema
    pub(super) fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Application users (authentication lives outside the store)
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                user_name TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            );

            -- Parts: in-house rows carry machine_id, outsourced rows company_name
            CREATE TABLE IF NOT EXISTS parts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                stock INTEGER NOT NULL,
                min INTEGER NOT NULL,
                max INTEGER NOT NULL,
                machine_id INTEGER,
                company_name TEXT,
                create_date TEXT NOT NULL,
                created_by INTEGER NOT NULL,
                last_updated TEXT NOT NULL,
                last_updated_by INTEGER NOT NULL,
                CHECK (machine_id IS NULL OR company_name IS NULL)
            );
            CREATE INDEX IF NOT EXISTS idx_parts_name ON parts(name);
            CREATE INDEX IF NOT EXISTS idx_parts_last_updated ON parts(last_updated);

            -- Products
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                stock INTEGER NOT NULL,
                min INTEGER NOT NULL,
                max INTEGER NOT NULL,
                create_date TEXT NOT NULL,
                created_by INTEGER NOT NULL,
                last_updated TEXT NOT NULL,
                last_updated_by INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
            CREATE INDEX IF NOT EXISTS idx_products_last_updated ON products(last_updated);

            -- Product/part links. Not unique: a part may be linked to the same
            -- product several times. link_id orders the occurrences.
            CREATE TABLE IF NOT EXISTS product_parts (
                link_id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL,
                part_id INTEGER NOT NULL,
                FOREIGN KEY (product_id) REFERENCES products(id),
                FOREIGN KEY (part_id) REFERENCES parts(id)
            );
            CREATE INDEX IF NOT EXISTS idx_product_parts_product ON product_parts(product_id);
            CREATE INDEX IF NOT EXISTS idx_product_parts_part ON product_parts(part_id);
            "#,
        )?;

        // Set schema version
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
