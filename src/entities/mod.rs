//! Entity type definitions
//!
//! The inventory tracks two entity types:
//!
//! - [`Part`] - a stocked part, either [`InHouse`] (made on one of our
//!   machines) or [`Outsourced`] (bought from a company)
//! - [`Product`] - a sellable item built from a multiset of parts

pub mod part;
pub mod product;

pub use part::{InHouse, Outsourced, Part, PartId, PartRef, PartSource, UNASSIGNED_ID};
pub use product::{Product, ProductId};
