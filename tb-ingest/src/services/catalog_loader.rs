//! Product catalog loading
//!
//! Reads a CSV product table with a header row. Only the `product_id` and
//! `product_name` columns are used; other columns (aisle, department, ...)
//! are ignored. Rows keep file order.

use crate::types::{Catalog, CatalogProduct};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog not found: {0}")]
    NotFound(PathBuf),

    #[error("Catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(#[from] tb_common::Error),
}

/// Load the catalog at `path`
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.is_file() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let products = reader
        .deserialize::<CatalogProduct>()
        .collect::<Result<Vec<_>, _>>()?;

    let catalog = Catalog::new(products)?;
    info!(path = %path.display(), products = catalog.len(), "Loaded product catalog");
    Ok(catalog)
}
