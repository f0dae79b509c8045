// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use std::path::Path;
use tinta_kernel::dist::ColorMetric;
use tinta_kernel::types::Product;
use tinta_node::catalog::Catalog;

use crate::open_store;

pub fn run(
    store_path: &Path,
    id: &str,
    limit: usize,
    metric: ColorMetric,
    json: bool,
) -> anyhow::Result<Vec<Product>> {
    if limit == 0 {
        anyhow::bail!("argument \"limit\" must be a positive number");
    }

    let catalog = Catalog::new(open_store(store_path), metric);
    let product = catalog
        .get_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("unknown product {}", id))?;

    let result = catalog.suggest_by_color(&product, limit);
    if result.skipped > 0 {
        eprintln!("Warning: {} products skipped (malformed color)", result.skipped);
    }

    if json {
        let suggestions: Vec<&Product> = result.hits.iter().map(|s| &s.record).collect();
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        println!(
            "\nClosest to #{} {} ({}) by {}",
            product.id,
            product.title,
            product.color.as_deref().unwrap_or("no color"),
            metric
        );

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Rank", "ID", "Title", "Color", "Distance"]);

        for (i, hit) in result.hits.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                hit.record.id.clone(),
                hit.record.title.clone(),
                hit.record.color.clone().unwrap_or_default(),
                format!("{:.3}", hit.distance),
            ]);
        }
        println!("{table}");
    }

    Ok(result.into_records())
}
