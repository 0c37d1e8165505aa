//! Data Processor Module
//! Label filtering (the dropdown filter) and per-chart category ordering.

use super::model::{Dataset, Product};
use std::collections::HashMap;
use std::fmt;

/// Active label filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelFilter {
    #[default]
    All,
    Label(String),
}

impl LabelFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            LabelFilter::All => true,
            LabelFilter::Label(label) => product.label == *label,
        }
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFilter::All => write!(f, "All"),
            LabelFilter::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Holds the active filter and the dropdown options.
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    options: Vec<LabelFilter>,
    active: LabelFilter,
}

impl FilterController {
    /// Options are `All` followed by the dataset labels; the preferred label is
    /// active when the dataset has it.
    pub fn new(dataset: &Dataset, preferred: &str) -> Self {
        let labels = dataset.labels();
        let active = if labels.iter().any(|l| l == preferred) {
            LabelFilter::Label(preferred.to_string())
        } else {
            LabelFilter::All
        };

        let mut options = vec![LabelFilter::All];
        options.extend(labels.into_iter().map(LabelFilter::Label));

        Self { options, active }
    }

    pub fn options(&self) -> &[LabelFilter] {
        &self.options
    }

    pub fn active(&self) -> &LabelFilter {
        &self.active
    }

    /// Switch the active filter. Returns true when it changed.
    pub fn select(&mut self, filter: LabelFilter) -> bool {
        if self.active == filter {
            return false;
        }
        self.active = filter;
        true
    }

    /// Rows passing the active filter.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Product> {
        filter_rows(dataset, &self.active)
    }
}

pub fn filter_rows<'a>(dataset: &'a Dataset, filter: &LabelFilter) -> Vec<&'a Product> {
    dataset.products().iter().filter(|p| filter.matches(p)).collect()
}

/// How a chart orders the distinct values of a category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOrder {
    /// Descending row count, ties lexicographic, keeping at most `limit`.
    TopByFrequency { limit: usize },
    /// Lexicographic, all values.
    Lexicographic,
}

/// Distinct non-empty brands of `rows` in the requested order.
pub fn brand_categories(rows: &[&Product], order: CategoryOrder) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for p in rows.iter().filter(|p| !p.brand.is_empty()) {
        *counts.entry(p.brand.as_str()).or_default() += 1;
    }

    let mut brands: Vec<(&str, usize)> = counts.into_iter().collect();
    match order {
        CategoryOrder::TopByFrequency { limit } => {
            brands.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            brands.truncate(limit);
        }
        CategoryOrder::Lexicographic => brands.sort_by(|a, b| a.0.cmp(b.0)),
    }
    brands.into_iter().map(|(b, _)| b.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_product as product;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            product("B", "Moisturizer", 10.0, 4.0, "", &[]),
            product("A", "Cleanser", 20.0, 4.0, "", &[]),
            product("B", "Cleanser", 30.0, 4.0, "", &[]),
            product("C", "Moisturizer", 40.0, 4.0, "", &[]),
            product("", "Moisturizer", 40.0, 4.0, "", &[]),
        ])
    }

    #[test]
    fn test_default_prefers_label() {
        let ds = dataset();
        let fc = FilterController::new(&ds, "Moisturizer");
        assert_eq!(fc.active(), &LabelFilter::Label("Moisturizer".into()));
        assert_eq!(fc.options()[0], LabelFilter::All);
        assert_eq!(fc.options().len(), 3);
    }

    #[test]
    fn test_default_falls_back_to_all() {
        let ds = dataset();
        let fc = FilterController::new(&ds, "Serum");
        assert_eq!(fc.active(), &LabelFilter::All);
        assert_eq!(fc.apply(&ds).len(), ds.len());
    }

    #[test]
    fn test_select_and_apply() {
        let ds = dataset();
        let mut fc = FilterController::new(&ds, "Moisturizer");
        assert_eq!(fc.apply(&ds).len(), 3);
        assert!(fc.select(LabelFilter::Label("Cleanser".into())));
        assert!(!fc.select(LabelFilter::Label("Cleanser".into())));
        assert!(fc.apply(&ds).iter().all(|p| p.label == "Cleanser"));
    }

    #[test]
    fn test_unknown_label_yields_empty_subset() {
        let ds = dataset();
        assert!(filter_rows(&ds, &LabelFilter::Label("Sunscreen".into())).is_empty());
    }

    #[test]
    fn test_brand_ordering_policies() {
        let ds = dataset();
        let rows = ds.rows();
        assert_eq!(
            brand_categories(&rows, CategoryOrder::TopByFrequency { limit: 2 }),
            vec!["B", "A"]
        );
        assert_eq!(
            brand_categories(&rows, CategoryOrder::Lexicographic),
            vec!["A", "B", "C"]
        );
    }
}
