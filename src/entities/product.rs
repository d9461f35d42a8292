//! Product entity type - sellable items assembled from parts

use serde::{Deserialize, Serialize};

use crate::entities::part::{Part, PartRef, UNASSIGNED_ID};

/// Storage-assigned product identifier
pub type ProductId = i64;

/// A Product entity
///
/// `associated_parts` is a multiset: the same part may appear more than once,
/// and the order and repetition are preserved through storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub min: u32,
    pub max: u32,

    /// Parts this product is built from (may repeat)
    #[serde(default)]
    pub associated_parts: Vec<Part>,
}

impl Product {
    /// Create a new product with no parts and an unassigned id
    pub fn new(name: impl Into<String>, price: f64, stock: u32, min: u32, max: u32) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            price,
            stock,
            min,
            max,
            associated_parts: Vec::new(),
        }
    }

    /// Builder-style variant of [`Product::add_associated_part`]
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = Part>) -> Self {
        self.associated_parts.extend(parts);
        self
    }

    pub fn add_associated_part(&mut self, part: Part) {
        self.associated_parts.push(part);
    }

    /// Remove one occurrence of the referenced part
    ///
    /// Returns false if the part is not associated.
    pub fn remove_associated_part(&mut self, part: PartRef) -> bool {
        match self
            .associated_parts
            .iter()
            .position(|p| p.part_ref() == part)
        {
            Some(index) => {
                self.associated_parts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Identity references of the associated parts, in order
    pub fn part_refs(&self) -> Vec<PartRef> {
        self.associated_parts.iter().map(Part::part_ref).collect()
    }

    pub fn is_new(&self) -> bool {
        self.id == UNASSIGNED_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt() -> Part {
        Part::in_house("Bolt", 0.25, 10, 1, 100, 7).with_id(1)
    }

    fn gasket() -> Part {
        Part::outsourced("Gasket", 1.5, 4, 2, 8, "Acme").with_id(2)
    }

    #[test]
    fn test_product_creation() {
        let product = Product::new("Widget Kit", 19.99, 5, 1, 10);

        assert!(product.is_new());
        assert!(product.associated_parts.is_empty());
    }

    #[test]
    fn test_remove_associated_part_removes_one_occurrence() {
        let mut product =
            Product::new("Widget Kit", 19.99, 5, 1, 10).with_parts([bolt(), bolt(), gasket()]);

        assert!(product.remove_associated_part(PartRef(1)));
        assert_eq!(product.part_refs(), vec![PartRef(1), PartRef(2)]);

        assert!(!product.remove_associated_part(PartRef(99)));
        assert_eq!(product.associated_parts.len(), 2);
    }

    #[test]
    fn test_missing_parts_deserialize_as_empty() {
        let yaml = "name: Widget Kit\nprice: 19.99\nstock: 5\nmin: 1\nmax: 10\n";
        let product: Product = serde_yml::from_str(yaml).unwrap();

        assert_eq!(product.id, UNASSIGNED_ID);
        assert!(product.associated_parts.is_empty());
    }
}
