//! Part entity type - in-house (manufactured) or outsourced (purchased) parts

use serde::{Deserialize, Serialize};

/// Storage-assigned part identifier
pub type PartId = i64;

/// Id carried by records that have not been stored yet
pub const UNASSIGNED_ID: i64 = 0;

/// Identity-only reference to a part
///
/// Two references are equal iff they name the same part id. Used for
/// counting associations without comparing full records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartRef(pub PartId);

impl PartRef {
    pub fn id(&self) -> PartId {
        self.0
    }
}

impl std::fmt::Display for PartRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a part comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSource {
    InHouse,
    Outsourced,
}

impl std::fmt::Display for PartSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartSource::InHouse => write!(f, "in-house"),
            PartSource::Outsourced => write!(f, "outsourced"),
        }
    }
}

impl std::str::FromStr for PartSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "in-house" | "inhouse" => Ok(PartSource::InHouse),
            "outsourced" => Ok(PartSource::Outsourced),
            _ => Err(format!(
                "Invalid part source: {}. Use 'in-house' or 'outsourced'",
                s
            )),
        }
    }
}

/// A part manufactured on one of our own machines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InHouse {
    #[serde(default)]
    pub id: PartId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub min: u32,
    pub max: u32,
    /// Machine that produces the part (never zero)
    pub machine_id: i64,
}

/// A part bought from an outside company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outsourced {
    #[serde(default)]
    pub id: PartId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub min: u32,
    pub max: u32,
    /// Supplying company (never blank)
    pub company_name: String,
}

/// A Part entity - exactly one of the two sourcing variants
///
/// `==` compares every field. Identity comparisons go through [`Part::part_ref`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Part {
    InHouse(InHouse),
    Outsourced(Outsourced),
}

impl Part {
    /// Create a new in-house part with an unassigned id
    pub fn in_house(
        name: impl Into<String>,
        price: f64,
        stock: u32,
        min: u32,
        max: u32,
        machine_id: i64,
    ) -> Self {
        Part::InHouse(InHouse {
            id: UNASSIGNED_ID,
            name: name.into(),
            price,
            stock,
            min,
            max,
            machine_id,
        })
    }

    /// Create a new outsourced part with an unassigned id
    pub fn outsourced(
        name: impl Into<String>,
        price: f64,
        stock: u32,
        min: u32,
        max: u32,
        company_name: impl Into<String>,
    ) -> Self {
        Part::Outsourced(Outsourced {
            id: UNASSIGNED_ID,
            name: name.into(),
            price,
            stock,
            min,
            max,
            company_name: company_name.into(),
        })
    }

    pub fn id(&self) -> PartId {
        match self {
            Part::InHouse(p) => p.id,
            Part::Outsourced(p) => p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Part::InHouse(p) => &p.name,
            Part::Outsourced(p) => &p.name,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Part::InHouse(p) => p.price,
            Part::Outsourced(p) => p.price,
        }
    }

    pub fn stock(&self) -> u32 {
        match self {
            Part::InHouse(p) => p.stock,
            Part::Outsourced(p) => p.stock,
        }
    }

    pub fn min(&self) -> u32 {
        match self {
            Part::InHouse(p) => p.min,
            Part::Outsourced(p) => p.min,
        }
    }

    pub fn max(&self) -> u32 {
        match self {
            Part::InHouse(p) => p.max,
            Part::Outsourced(p) => p.max,
        }
    }

    pub fn source(&self) -> PartSource {
        match self {
            Part::InHouse(_) => PartSource::InHouse,
            Part::Outsourced(_) => PartSource::Outsourced,
        }
    }

    /// Machine id for in-house parts
    pub fn machine_id(&self) -> Option<i64> {
        match self {
            Part::InHouse(p) => Some(p.machine_id),
            Part::Outsourced(_) => None,
        }
    }

    /// Company name for outsourced parts
    pub fn company_name(&self) -> Option<&str> {
        match self {
            Part::InHouse(_) => None,
            Part::Outsourced(p) => Some(&p.company_name),
        }
    }

    pub fn part_ref(&self) -> PartRef {
        PartRef(self.id())
    }

    /// Whether storage has assigned an id yet
    pub fn is_new(&self) -> bool {
        self.id() == UNASSIGNED_ID
    }

    /// Return the same part carrying the given id
    pub fn with_id(mut self, id: PartId) -> Self {
        match &mut self {
            Part::InHouse(p) => p.id = id,
            Part::Outsourced(p) => p.id = id,
        }
        self
    }
}
