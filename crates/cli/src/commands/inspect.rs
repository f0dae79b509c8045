// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use std::path::Path;
use tinta_kernel::index::Candidate;
use tinta_node::store::ReloadOutcome;

use crate::open_store;

pub fn run(store_path: &Path) -> anyhow::Result<()> {
    println!("\nTinta Store Report");
    println!("------------------");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Item", "Status", "Details"]);

    // 1. Document file
    match std::fs::metadata(store_path) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339())
                .unwrap_or_else(|_| "unknown".to_string());
            let msg = format!("{} bytes, modified {}", meta.len(), modified);
            table.add_row(vec!["Document", "FOUND", &msg]);
        }
        Err(_) => {
            table.add_row(vec!["Document", "MISSING", &store_path.display().to_string()]);
        }
    }

    // 2. What a node would load from it
    let store = open_store(store_path);
    match store.reload_outcome() {
        ReloadOutcome::Loaded { records } => {
            table.add_row(vec!["Reload", "OK", &format!("{} records", records)]);
        }
        ReloadOutcome::Missing | ReloadOutcome::Volatile => {
            table.add_row(vec!["Reload", "EMPTY", ""]);
        }
        ReloadOutcome::Malformed { error } => {
            table.add_row(vec!["Reload", "CORRUPT", error]);
        }
        ReloadOutcome::Unreadable { error } => {
            table.add_row(vec!["Reload", "ERROR", error]);
        }
    }

    // 3. Color coverage
    let products = store.list();
    let colored = products.iter().filter(|p| p.has_feature()).count();
    let malformed = products
        .iter()
        .filter(|p| p.has_feature() && p.rgb().is_err())
        .count();
    let pending = products
        .iter()
        .filter(|p| !p.has_feature() && !p.photo.trim().is_empty())
        .count();
    table.add_row(vec![
        "Colors",
        if malformed == 0 { "OK" } else { "WARN" },
        &format!(
            "{}/{} colored, {} malformed, {} awaiting import",
            colored,
            products.len(),
            malformed,
            pending
        ),
    ]);

    println!("{table}");

    if products.is_empty() {
        return Ok(());
    }

    // 4. Products
    let mut products = products;
    products.sort_by(|a, b| a.id.cmp(&b.id));

    let mut listing = Table::new();
    listing
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Title", "Gender", "Color"]);
    for p in &products {
        listing.add_row(vec![
            p.id.as_str(),
            p.title.as_str(),
            p.gender.as_str(),
            p.color.as_deref().unwrap_or("-"),
        ]);
    }
    println!("{listing}");

    Ok(())
}
