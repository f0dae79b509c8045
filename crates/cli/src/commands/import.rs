// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;

use anyhow::Context;
use tinta_kernel::dist::ColorMetric;
use tinta_node::catalog::Catalog;

use crate::open_store;

/// Loads a CSV file into the store document at `store_path` and writes it
/// back before returning. Returns the number of imported rows.
pub fn run(csv_path: &Path, store_path: &Path) -> anyhow::Result<usize> {
    let store = open_store(store_path);
    let before = store.count();

    let catalog = Catalog::new(store.clone(), ColorMetric::default());
    let total = catalog
        .import_csv(csv_path)
        .with_context(|| format!("Import of {} failed", csv_path.display()))?;

    // Mutations outside a runtime only mark the store dirty; write it now
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(store.flush())
        .with_context(|| format!("Failed to write {}", store_path.display()))?;

    println!(
        "Imported {} products into {} ({} before, {} now)",
        total,
        store_path.display(),
        before,
        store.count()
    );
    Ok(total)
}
