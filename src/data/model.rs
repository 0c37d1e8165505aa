//! Product Data Model
//! Row type for the cosmetics dataset and the loaded, read-only dataset.

use serde::Serialize;
use std::collections::HashSet;

/// Skin types the dataset carries one suitability column for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SkinType {
    Combination,
    Dry,
    Normal,
    Oily,
    Sensitive,
}

impl SkinType {
    pub const ALL: [SkinType; 5] = [
        SkinType::Combination,
        SkinType::Dry,
        SkinType::Normal,
        SkinType::Oily,
        SkinType::Sensitive,
    ];

    /// Column name in the CSV file (also used as the display name).
    pub fn name(self) -> &'static str {
        match self {
            SkinType::Combination => "Combination",
            SkinType::Dry => "Dry",
            SkinType::Normal => "Normal",
            SkinType::Oily => "Oily",
            SkinType::Sensitive => "Sensitive",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One product record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub brand: String,
    pub label: String,
    /// NaN when the cell was missing or not numeric.
    pub price: f64,
    /// Customer rating from the `Rank` column. NaN when missing.
    pub rating: f64,
    pub ingredients: String,
    /// Suitability flags indexed by `SkinType::index`.
    pub skin: [bool; 5],
}

impl Product {
    pub fn suits(&self, skin: SkinType) -> bool {
        self.skin[skin.index()]
    }

    /// Distinct, trimmed, non-empty ingredient names in first-seen order.
    pub fn ingredient_set(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.ingredients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && seen.insert(*s))
            .collect()
    }
}

/// Loaded dataset. Immutable after load; shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    products: Vec<Product>,
}

impl Dataset {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All rows as a borrowed subset.
    #[cfg(test)]
    pub fn rows(&self) -> Vec<&Product> {
        self.products.iter().collect()
    }

    /// Distinct non-empty labels in first-seen order.
    pub fn labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .filter(|p| !p.label.is_empty() && seen.insert(p.label.as_str()))
            .map(|p| p.label.clone())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a product for tests; `skins` lists the suitable skin types.
    pub(crate) fn product(
        brand: &str,
        label: &str,
        price: f64,
        rating: f64,
        ingredients: &str,
        skins: &[SkinType],
    ) -> Product {
        let mut skin = [false; 5];
        for s in skins {
            skin[s.index()] = true;
        }
        Product {
            brand: brand.to_string(),
            label: label.to_string(),
            price,
            rating,
            ingredients: ingredients.to_string(),
            skin,
        }
    }

    #[test]
    fn test_ingredient_set_dedups_and_trims() {
        let p = product("A", "Cleanser", 10.0, 4.0, " Water, Glycerin ,Water,, ", &[]);
        assert_eq!(p.ingredient_set(), vec!["Water", "Glycerin"]);
    }

    #[test]
    fn test_labels_first_seen_order() {
        let ds = Dataset::new(vec![
            product("A", "Moisturizer", 1.0, 1.0, "", &[]),
            product("B", "Cleanser", 1.0, 1.0, "", &[]),
            product("C", "", 1.0, 1.0, "", &[]),
            product("D", "Moisturizer", 1.0, 1.0, "", &[]),
        ]);
        assert_eq!(ds.labels(), vec!["Moisturizer", "Cleanser"]);
    }

    #[test]
    fn test_suits_reads_flag() {
        let p = product("A", "Mask", 1.0, 1.0, "", &[SkinType::Dry, SkinType::Oily]);
        assert!(p.suits(SkinType::Dry));
        assert!(p.suits(SkinType::Oily));
        assert!(!p.suits(SkinType::Normal));
    }
}
