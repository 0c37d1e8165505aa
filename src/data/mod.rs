//! Data module - CSV loading, bucketing and filtering

pub mod buckets;
mod loader;
mod model;
mod processor;

pub use loader::DataLoader;
pub use model::{Dataset, Product, SkinType};
pub use processor::{brand_categories, CategoryOrder, FilterController, LabelFilter};

#[cfg(test)]
pub(crate) use model::tests::product as test_product;
#[cfg(test)]
pub(crate) use processor::filter_rows;
