//! Read-only reports across parts and products

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use super::{format_timestamp, parse_timestamp, Store};
use crate::core::error::StoreResult;

/// Whether a report row is a part or a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Part,
    Product,
}

impl ItemKind {
    fn table(&self) -> &'static str {
        match self {
            ItemKind::Part => "parts",
            ItemKind::Product => "products",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Part => write!(f, "Part"),
            ItemKind::Product => write!(f, "Product"),
        }
    }
}

/// A part or product that changed recently
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportItem {
    pub id: i64,
    pub name: String,
    pub kind: ItemKind,
    pub stock: u32,
    pub last_updated: DateTime<Utc>,
}

/// Stock position of a part or product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLine {
    pub id: i64,
    pub name: String,
    pub kind: ItemKind,
    pub stock: u32,
    pub min: u32,
    pub max: u32,
}

impl StockLine {
    /// Stock at or below the minimum level
    pub fn needs_reorder(&self) -> bool {
        self.stock <= self.min
    }
}

impl Store {
    /// Parts then products with `last_updated >= since`, each ordered by id
    pub fn updated_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ReportItem>> {
        let since = format_timestamp(&since);
        let mut items = Vec::new();

        for kind in [ItemKind::Part, ItemKind::Product] {
            let sql = format!(
                "SELECT id, name, stock, last_updated FROM {} WHERE last_updated >= ?1 ORDER BY id",
                kind.table()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params![since], |row| {
                Ok(ReportItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    kind,
                    stock: row.get(2)?,
                    last_updated: parse_timestamp(row.get::<_, String>(3)?),
                })
            })?;
            for row in rows {
                items.push(row?);
            }
        }

        Ok(items)
    }

    /// Stock levels of every part then every product, each ordered by id
    pub fn stock_levels(&self) -> StoreResult<Vec<StockLine>> {
        let mut lines = Vec::new();

        for kind in [ItemKind::Part, ItemKind::Product] {
            let sql = format!(
                "SELECT id, name, stock, min, max FROM {} ORDER BY id",
                kind.table()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok(StockLine {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    kind,
                    stock: row.get(2)?,
                    min: row.get(3)?,
                    max: row.get(4)?,
                })
            })?;
            for row in rows {
                lines.push(row?);
            }
        }

        Ok(lines)
    }
}
