// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{sample_jobs, sample_products};
use harvestrs::config::settings::OutputFormat;
use harvestrs::domain::models::listing::SourceKind;
use harvestrs::domain::models::record::{FieldValue, RecordSet};
use harvestrs::infrastructure::storage::RecordStorage;
use harvestrs::utils::errors::PersistenceError;

const ALL_FORMATS: [OutputFormat; 4] = [
    OutputFormat::Csv,
    OutputFormat::Json,
    OutputFormat::Excel,
    OutputFormat::Sqlite,
];

#[tokio::test]
async fn test_round_trip_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());
    let records = sample_products();

    for format in ALL_FORMATS {
        let path = storage.save(&records, "products_data", format).await.unwrap();
        assert_eq!(
            path,
            dir.path().join(format!("products_data.{}", format.extension()))
        );

        let loaded = storage.load(&path, format).await.unwrap();
        assert_eq!(loaded, records, "round trip through {format}");
        assert_eq!(loaded.field_names(), records.field_names(), "columns of {format}");
    }

    // input is borrowed, not consumed
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_numeric_looking_text_survives_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());
    let jobs = sample_jobs();

    for format in ALL_FORMATS {
        let path = storage.save(&jobs, "jobs_data", format).await.unwrap();

        let loaded = storage.load_source(&path, format, SourceKind::Jobs).await.unwrap();

        assert_eq!(loaded, jobs, "round trip through {format}");
        assert_eq!(loaded.field_names(), jobs.field_names(), "columns of {format}");
        let first = &loaded.records()[0];
        assert!(
            matches!(first.value("salary"), FieldValue::Text(s) if s == "8000"),
            "{format}: {:?}",
            first.value("salary")
        );
        assert!(matches!(first.value("posted_date"), FieldValue::Text(s) if s == "2024"));
        assert!(matches!(loaded.records()[1].value("salary"), FieldValue::Text(s) if s == "4500.50"));
    }
}

#[tokio::test]
async fn test_source_load_restores_numeric_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());
    let products = sample_products();

    for format in ALL_FORMATS {
        let path = storage.save(&products, "products_data", format).await.unwrap();

        let loaded = storage
            .load_source(&path, format, SourceKind::Products)
            .await
            .unwrap();

        assert_eq!(loaded, products, "round trip through {format}");
        let first = &loaded.records()[0];
        assert!(matches!(first.value("reviews_count"), FieldValue::Integer(1234)), "{format}");
        assert!(matches!(first.value("price"), FieldValue::Float(_)), "{format}");
    }
}

#[tokio::test]
async fn test_missing_rating_is_empty_csv_cell() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());

    let path = storage
        .save(&sample_products(), "products_data", OutputFormat::Csv)
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("name,category,price,rating,reviews_count,availability,brand,url")
    );
    lines.next();
    assert_eq!(
        lines.next(),
        Some("Sofá Retrátil,casa,2100.0,,0,Últimas unidades,,https://loja.example.com/p/sofa")
    );

    let loaded = storage.load(&path, OutputFormat::Csv).await.unwrap();
    assert!(loaded.records()[1].value("rating").is_null());
    assert_eq!(loaded.records()[1].value("price"), &FieldValue::Float(2100.0));
}

#[tokio::test]
async fn test_empty_set_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());
    let empty = RecordSet::new();

    for format in ALL_FORMATS {
        let path = storage.save(&empty, "empty", format).await.unwrap();
        assert!(path.exists(), "{format} file should exist");
        assert!(storage.load(&path, format).await.unwrap().is_empty());
    }

    assert!(std::fs::read(dir.path().join("empty.csv")).unwrap().is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("empty.json")).unwrap().trim(),
        "[]"
    );
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path().join("out"));

    let result = storage.save_as(&sample_products(), "products_data", "xml").await;

    assert!(matches!(result, Err(PersistenceError::UnsupportedFormat(_))));
    assert!(!dir.path().join("out").exists());

    let path = storage
        .save_as(&sample_products(), "products_data", "XLSX")
        .await
        .unwrap();
    assert_eq!(path.extension().unwrap(), "xlsx");
}

#[tokio::test]
async fn test_unwritable_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"file").unwrap();
    let storage = RecordStorage::new(blocker.join("output"));

    for format in ALL_FORMATS {
        let result = storage.save(&sample_products(), "products_data", format).await;
        assert!(
            matches!(result, Err(PersistenceError::Unwritable { .. })),
            "{format}: {result:?}"
        );
    }
}

#[tokio::test]
async fn test_sqlite_overwrite_replaces_table() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());
    let records = sample_products();

    storage.save(&records, "products_data", OutputFormat::Sqlite).await.unwrap();
    let path = storage.save(&records, "products_data", OutputFormat::Sqlite).await.unwrap();

    let loaded = storage.load(&path, OutputFormat::Sqlite).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded, records);
}
