// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Product catalog: the store plus the operations the API exposes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use tinta_kernel::dist::{product_distance, ColorMetric};
use tinta_kernel::index::brute_force::select_top_k;
use tinta_kernel::index::{Candidate, SelectionResult};
use tinta_kernel::types::Product;

use crate::csv_import::ProductReader;
use crate::network::{ColorExtractor, ExtractError};
use crate::store::Store;

/// Concurrent requests to the image service during a color import.
const EXTRACT_CONCURRENCY: usize = 4;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("File not found")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error at line {line}: {source}")]
    Csv { line: u64, source: csv::Error },

    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("No color extractor configured")]
    NoExtractor,
}

#[derive(Clone)]
pub struct Catalog {
    products: Store<Product>,
    metric: ColorMetric,
    extractor: Option<Arc<dyn ColorExtractor>>,
}

impl Catalog {
    pub fn new(products: Store<Product>, metric: ColorMetric) -> Self {
        Self { products, metric, extractor: None }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ColorExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn store(&self) -> &Store<Product> {
        &self.products
    }

    pub fn metric(&self) -> ColorMetric {
        self.metric
    }

    pub fn get_by_id(&self, id: &str) -> Option<Product> {
        self.products.get(id)
    }

    pub fn count(&self) -> usize {
        self.products.count()
    }

    pub fn add(&self, product: Product) {
        self.products.add(product.id.clone(), product);
    }

    pub fn remove(&self, id: &str) {
        self.products.remove(id);
    }

    /// The `limit` products whose color is closest to `product`'s.
    pub fn suggest_by_color(&self, product: &Product, limit: usize) -> SelectionResult<Product> {
        let metric = self.metric;
        let result = select_top_k(product, self.products.list(), limit, |a, b| {
            product_distance(metric, a, b)
        });
        if result.skipped > 0 {
            metrics::counter!("tinta_selector_skipped_total", result.skipped as u64);
        }
        result
    }

    /// Adds every row of a `;`-delimited product file. Returns the number of
    /// rows imported. Stops at the first bad row; earlier rows are kept.
    pub fn import_csv(&self, path: &Path) -> Result<usize, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }

        let file = std::fs::File::open(path)?;
        let mut total = 0;
        for product in ProductReader::new(std::io::BufReader::new(file))? {
            let product = product?;
            tracing::debug!(product = %product, "Saving");
            self.add(product);
            total += 1;
        }

        tracing::info!(path = %path.display(), total, "CSV import complete");
        Ok(total)
    }

    /// Fetches the dominant color of up to `limit` products that have a photo
    /// but no color yet, in key order. Failed lookups are logged and skipped.
    pub async fn import_colors(&self, limit: usize) -> Result<usize, CatalogError> {
        let extractor = self.extractor.clone().ok_or(CatalogError::NoExtractor)?;

        let mut pending: Vec<Product> = self
            .products
            .list()
            .into_iter()
            .filter(|p| !p.has_feature() && !p.photo.trim().is_empty())
            .collect();
        pending.sort_by(|a, b| a.id.cmp(&b.id));
        pending.truncate(limit);

        let results: Vec<(String, Result<_, ExtractError>)> = stream::iter(pending)
            .map(|p| {
                let extractor = Arc::clone(&extractor);
                async move {
                    let color = extractor.dominant_color(&p.photo).await;
                    (p.id, color)
                }
            })
            .buffer_unordered(EXTRACT_CONCURRENCY)
            .collect()
            .await;

        let mut total = 0;
        for (id, color) in results {
            match color {
                Ok(color) => {
                    // Re-read: the product may have changed while we waited
                    if let Some(mut current) = self.products.get(&id) {
                        current.set_color(color);
                        self.products.add(id, current);
                        total += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(product = %id, error = %e, "Color extraction failed, skipping");
                }
            }
        }

        tracing::info!(total, "Color import complete");
        Ok(total)
    }
}
