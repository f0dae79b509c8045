// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::cell::Cell;

use crate::dist::{product_distance, ColorMetric};
use crate::error::KernelError;
use crate::index::brute_force::select_top_k;
use crate::types::Product;

fn product(id: &str, color: Option<&str>) -> Product {
    let p = Product::new(id, id);
    match color {
        Some(c) => p.with_color(c),
        None => p,
    }
}

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

fn cie76(a: &Product, b: &Product) -> Result<f64, KernelError> {
    product_distance(ColorMetric::Cie76, a, b)
}

fn pool() -> Vec<Product> {
    vec![
        product("P1", Some("#000000")),
        product("P2", Some("#0A0A0A")),
        product("P3", Some("#FFFFFF")),
        product("P4", None),
    ]
}

#[test]
fn test_query_excluded_by_key() {
    let query = product("P1", Some("#000000"));
    let result = select_top_k(&query, pool(), 2, cie76);

    let records = result.into_records();
    assert_eq!(ids(&records), vec!["P2", "P3"]);
}

#[test]
fn test_distinct_query_ranks_exact_match_first() {
    let query = product("Q", Some("#000000"));
    let result = select_top_k(&query, pool(), 2, cie76);

    assert_eq!(result.hits[0].record.id, "P1");
    assert_eq!(result.hits[0].distance, 0.0);
    assert_eq!(result.hits[1].record.id, "P2");
    assert_eq!(result.skipped, 0);
}

#[test]
fn test_limit_larger_than_pool() {
    let query = product("P1", Some("#000000"));
    let result = select_top_k(&query, pool(), 10, cie76);

    // P1 is the query, P4 has no color
    assert_eq!(result.len(), 2);
    assert_eq!(ids(&result.into_records()), vec!["P2", "P3"]);
}

#[test]
fn test_query_without_color_does_not_scan() {
    let calls = Cell::new(0);
    let query = product("Q", None);
    let result = select_top_k(&query, pool(), 5, |a: &Product, b: &Product| {
        calls.set(calls.get() + 1);
        cie76(a, b)
    });

    assert!(result.is_empty());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_zero_limit_is_empty() {
    let query = product("Q", Some("#000000"));
    assert!(select_top_k(&query, pool(), 0, cie76).is_empty());
}

#[test]
fn test_malformed_candidate_is_skipped() {
    let mut candidates = pool();
    candidates.insert(1, product("BAD", Some("#not-a-color")));

    let query = product("Q", Some("#000000"));
    let result = select_top_k(&query, candidates, 3, cie76);

    assert_eq!(result.skipped, 1);
    assert_eq!(ids(&result.into_records()), vec!["P1", "P2", "P3"]);
}

#[test]
fn test_non_finite_distance_is_skipped() {
    let query = product("Q", Some("#000000"));
    let result = select_top_k(&query, pool(), 3, |_: &Product, b: &Product| {
        if b.id == "P2" {
            Ok::<f64, KernelError>(f64::NAN)
        } else {
            cie76(&query, b)
        }
    });

    assert_eq!(result.skipped, 1);
    assert_eq!(ids(&result.into_records()), vec!["P1", "P3"]);
}

#[test]
fn test_tie_breaking_order() {
    // Same color, fed in reverse key order
    let candidates = vec![
        product("c", Some("#808080")),
        product("b", Some("#808080")),
        product("a", Some("#808080")),
    ];
    let query = product("Q", Some("#000000"));

    let result = select_top_k(&query, candidates.clone(), 1, cie76);
    assert_eq!(ids(&result.into_records()), vec!["a"]);

    let result = select_top_k(&query, candidates, 3, cie76);
    assert_eq!(ids(&result.into_records()), vec!["a", "b", "c"]);
}

#[test]
fn test_bounded_scan_matches_full_sort() {
    let candidates: Vec<Product> = (0u32..200)
        .map(|i| {
            // Deterministic scramble of grey levels
            let level = (i * 37 % 251) as u8;
            product(&format!("p{:03}", i), Some(&format!("#{0:02X}{0:02X}{0:02X}", level)))
        })
        .collect();
    let query = product("Q", Some("#404040"));

    let mut expected: Vec<(f64, String)> = candidates
        .iter()
        .map(|c| (cie76(&query, c).unwrap(), c.id.clone()))
        .collect();
    expected.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let expected: Vec<String> = expected.into_iter().take(7).map(|(_, id)| id).collect();

    let result = select_top_k(&query, candidates, 7, cie76);
    let got: Vec<String> = result.hits.iter().map(|h| h.record.id.clone()).collect();
    assert_eq!(got, expected);

    for pair in result.hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}
