// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use tempfile::tempdir;
use tinta_cli::commands::{import, inspect, suggest};
use tinta_cli::open_store;
use tinta_kernel::dist::ColorMetric;

const CSV: &str = "id;title;gender_id;composition;sleeve;photo;url;color
1;Red shirt;MAN;cotton;long;//img/1.jpg;http://shop/1;#FF0000
2;Red dress;WOMAN;silk;short;//img/2.jpg;http://shop/2;#F00000
3;Navy scarf;WOMAN;wool;;//img/3.jpg;http://shop/3;#000080
4;Plain tee;MAN;cotton;short;//img/4.jpg;http://shop/4;
";

#[test]
fn test_import_then_suggest() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("products.csv");
    let store_path = dir.path().join("data").join("products.json");
    std::fs::write(&csv_path, CSV).unwrap();

    // Import writes the document before returning
    let total = import::run(&csv_path, &store_path).unwrap();
    assert_eq!(total, 4);
    assert!(store_path.exists());
    assert_eq!(open_store(&store_path).count(), 4);

    let result = inspect::run(&store_path);
    assert!(result.is_ok());

    let hits = suggest::run(&store_path, "1", 2, ColorMetric::Cie76, false).unwrap();
    let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"]);

    let hits = suggest::run(&store_path, "1", 1, ColorMetric::Rgb, true).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "2");
}

#[test]
fn test_suggest_unknown_product() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("products.json");
    let err = suggest::run(&store_path, "nope", 5, ColorMetric::default(), false).unwrap_err();
    assert!(err.to_string().contains("unknown product nope"));
}

#[test]
fn test_inspect_corrupt_document() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("products.json");
    std::fs::write(&store_path, "not json").unwrap();

    // Reported, not an error
    assert!(inspect::run(&store_path).is_ok());
    assert_eq!(open_store(&store_path).count(), 0);
}

#[test]
fn test_import_missing_csv() {
    let dir = tempdir().unwrap();
    let err = import::run(&dir.path().join("missing.csv"), &dir.path().join("products.json")).unwrap_err();
    assert!(err.to_string().contains("missing.csv"));
}

#[test]
fn test_suggest_rejects_zero_limit() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("products.csv");
    let store_path = dir.path().join("products.json");
    std::fs::write(&csv_path, CSV).unwrap();
    import::run(&csv_path, &store_path).unwrap();

    let err = suggest::run(&store_path, "1", 0, ColorMetric::Rgb, true).unwrap_err();
    assert_eq!(err.to_string(), "argument \"limit\" must be a positive number");
}
