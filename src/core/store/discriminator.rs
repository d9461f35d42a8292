//! Mapping between the flat `parts` row and the [`Part`] sum type
//!
//! Both variants share one relation with two mutually exclusive nullable
//! columns, `machine_id` and `company_name`. This is the only place that
//! reconstructs the variant from those columns or flattens it back.

use rusqlite::Row;

use crate::entities::{InHouse, Outsourced, Part, PartId};

/// Which variant a stored row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    InHouse,
    Outsourced,
    /// Neither column identifies the row
    Indeterminate,
}

/// Decide the variant from the raw nullable columns
///
/// A present, non-zero machine id wins; otherwise a present, non-blank
/// company name; otherwise the row is indeterminate.
pub fn discriminate(machine_id: Option<i64>, company_name: Option<&str>) -> Variant {
    if machine_id.is_some_and(|m| m != 0) {
        Variant::InHouse
    } else if company_name.is_some_and(|c| !c.trim().is_empty()) {
        Variant::Outsourced
    } else {
        Variant::Indeterminate
    }
}

/// A `parts` row as stored, before discrimination
#[derive(Debug, Clone, PartialEq)]
pub struct PartRow {
    pub id: PartId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub min: u32,
    pub max: u32,
    pub machine_id: Option<i64>,
    pub company_name: Option<String>,
}

impl PartRow {
    /// Column list matching [`PartRow::from_row`]
    pub(super) const COLUMNS: &'static str =
        "id, name, price, stock, min, max, machine_id, company_name";

    /// Read a row selected with [`PartRow::COLUMNS`]
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
            stock: row.get(3)?,
            min: row.get(4)?,
            max: row.get(5)?,
            machine_id: row.get(6)?,
            company_name: row.get(7)?,
        })
    }

    /// Flatten a part into its row shape; the other variant's column is None
    pub fn from_part(part: &Part) -> Self {
        Self {
            id: part.id(),
            name: part.name().to_string(),
            price: part.price(),
            stock: part.stock(),
            min: part.min(),
            max: part.max(),
            machine_id: part.machine_id(),
            company_name: part.company_name().map(str::to_string),
        }
    }

    pub fn variant(&self) -> Variant {
        discriminate(self.machine_id, self.company_name.as_deref())
    }

    /// Rebuild the part, or None if the row is indeterminate
    pub fn into_part(self) -> Option<Part> {
        match self.variant() {
            Variant::InHouse => Some(Part::InHouse(InHouse {
                id: self.id,
                name: self.name,
                price: self.price,
                stock: self.stock,
                min: self.min,
                max: self.max,
                machine_id: self.machine_id.unwrap_or_default(),
            })),
            Variant::Outsourced => Some(Part::Outsourced(Outsourced {
                id: self.id,
                name: self.name,
                price: self.price,
                stock: self.stock,
                min: self.min,
                max: self.max,
                company_name: self.company_name.unwrap_or_default(),
            })),
            Variant::Indeterminate => None,
        }
    }
}
