//! CSV Data Loader Module
//! Reads the cosmetics CSV with Polars and converts it into product rows.

use super::model::{Dataset, Product, SkinType};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("No data loaded")]
    NoData,
}

pub const BRAND_COL: &str = "Brand";
pub const LABEL_COL: &str = "Label";
pub const PRICE_COL: &str = "Price";
pub const RANK_COL: &str = "Rank";
pub const INGREDIENTS_COL: &str = "Ingredients";

/// Loads the product CSV and keeps the resulting dataset.
pub struct DataLoader {
    dataset: Option<Arc<Dataset>>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            dataset: None,
            file_path: None,
        }
    }

    /// Read a CSV file into a dataset without touching loader state.
    ///
    /// Safe to call from a background thread.
    pub fn read_csv(file_path: &Path) -> Result<Dataset, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Self::dataset_from_frame(&df)
    }

    /// Convert a DataFrame into product rows.
    ///
    /// Skin-type columns are optional; a missing column leaves the flag unset.
    pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset, LoaderError> {
        let brands = string_column(df, BRAND_COL)?;
        let labels = string_column(df, LABEL_COL)?;
        let prices = numeric_column(df, PRICE_COL)?;
        let ratings = numeric_column(df, RANK_COL)?;
        let ingredients = string_column(df, INGREDIENTS_COL)?;

        let flags: Vec<Option<Vec<bool>>> = SkinType::ALL
            .iter()
            .map(|skin| flag_column(df, skin.name()))
            .collect::<Result<_, _>>()?;

        let products = (0..df.height())
            .map(|i| {
                let mut skin = [false; 5];
                for (slot, column) in skin.iter_mut().zip(&flags) {
                    *slot = column.as_ref().is_some_and(|c| c[i]);
                }
                Product {
                    brand: brands[i].clone(),
                    label: labels[i].clone(),
                    price: prices[i],
                    rating: ratings[i],
                    ingredients: ingredients[i].clone(),
                    skin,
                }
            })
            .collect();

        Ok(Dataset::new(products))
    }

    /// Get the loaded dataset.
    pub fn get_dataset(&self) -> Option<Arc<Dataset>> {
        self.dataset.clone()
    }

    /// Get the number of loaded rows.
    pub fn get_row_count(&self) -> usize {
        self.dataset.as_ref().map(|d| d.len()).unwrap_or(0)
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set the dataset directly (used for async loading)
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>, file_path: PathBuf) {
        self.dataset = Some(dataset);
        self.file_path = Some(file_path);
    }

    /// Require a loaded dataset.
    pub fn require_dataset(&self) -> Result<Arc<Dataset>, LoaderError> {
        self.dataset.clone().ok_or(LoaderError::NoData)
    }
}

fn required<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, LoaderError> {
    df.column(name)
        .map_err(|_| LoaderError::MissingColumn(name.to_string()))
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, LoaderError> {
    let column = required(df, name)?.cast(&DataType::String)?;
    let ca = column.str()?;
    Ok(ca
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).unwrap_or_default())
        .collect())
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoaderError> {
    let column = required(df, name)?.cast(&DataType::Float64)?;
    let ca = column.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// A flag is set when the cell is `1` (numeric) or `"1"` (text).
fn flag_column(df: &DataFrame, name: &str) -> Result<Option<Vec<bool>>, LoaderError> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };
    let column = column.cast(&DataType::Float64)?;
    let ca = column.f64()?;
    Ok(Some(ca.into_iter().map(|v| v == Some(1.0)).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(name: &str, csv: &str) -> Result<Dataset, LoaderError> {
        let path = std::env::temp_dir().join(format!(
            "cosmetics_dashboard_{}_{}.csv",
            std::process::id(),
            name
        ));
        std::fs::write(&path, csv).unwrap();
        let result = DataLoader::read_csv(&path);
        std::fs::remove_file(path).ok();
        result
    }

    const SAMPLE: &str = "\
Label,Brand,Name,Price,Rank,Ingredients,Combination,Dry,Normal,Oily,Sensitive
Moisturizer,LA MER,Creme de la Mer,175,4.1,\"Algae, Water, Glycerin\",1,1,1,1,1
Cleanser,TATCHA,Rice Wash,38,4.4,\"Water, Rice Bran\",0,1,0,0,1
Moisturizer,CLINIQUE,Gel,,3.5,Water,1,0,0,1,0
";

    #[test]
    fn test_parse_sample() {
        let ds = read_str("sample", SAMPLE).unwrap();
        assert_eq!(ds.len(), 3);

        let first = &ds.products()[0];
        assert_eq!(first.brand, "LA MER");
        assert_eq!(first.label, "Moisturizer");
        assert_eq!(first.price, 175.0);
        assert!((first.rating - 4.1).abs() < 1e-9);
        assert_eq!(first.ingredient_set(), vec!["Algae", "Water", "Glycerin"]);
        assert!(first.suits(SkinType::Sensitive));

        let second = &ds.products()[1];
        assert!(second.suits(SkinType::Dry));
        assert!(!second.suits(SkinType::Oily));
    }

    #[test]
    fn test_missing_price_is_nan() {
        let ds = read_str("missing_price", SAMPLE).unwrap();
        assert!(ds.products()[2].price.is_nan());
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Brand,Price\nA,10\n";
        let err = read_str("missing_label", csv).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == LABEL_COL));
    }

    #[test]
    fn test_skin_columns_optional() {
        let csv = "Label,Brand,Price,Rank,Ingredients\nMask,A,10,4,Water\n";
        let ds = read_str("no_skin", csv).unwrap();
        assert_eq!(ds.products()[0].skin, [false; 5]);
    }

    #[test]
    fn test_require_dataset_without_load() {
        let loader = DataLoader::new();
        assert!(matches!(loader.require_dataset(), Err(LoaderError::NoData)));
        assert_eq!(loader.get_row_count(), 0);
    }
}
