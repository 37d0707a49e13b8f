// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fast_config, MockPage, MockSource, JOBS_PAGE, MALFORMED_PAGE};
use harvestrs::config::settings::{OutputFormat, SourceSettings};
use harvestrs::domain::models::record::FieldValue;
use harvestrs::domain::services::analyzer::DataAnalyzer;
use harvestrs::domain::services::scrape_service::{JobScraper, PageError, ScrapeService};
use harvestrs::engines::retrying_fetcher::RetryingFetcher;
use harvestrs::extractors::job::{JobExtractor, JobSelectors};
use harvestrs::infrastructure::storage::RecordStorage;
use harvestrs::utils::errors::{ConfigurationError, FetchError};
use std::sync::Arc;

fn job_scraper(source: &MockSource, max_pages: u32, max_retries: u32) -> JobScraper {
    let fetcher = RetryingFetcher::from_config(&fast_config(max_retries)).unwrap();
    let extractor = JobExtractor::new(&JobSelectors::default()).unwrap();
    ScrapeService::new(
        Arc::new(fetcher),
        extractor,
        SourceSettings {
            url_template: source.template(),
            max_pages,
        },
    )
}

#[tokio::test]
async fn test_malformed_page_is_skipped() {
    let source = MockSource::start(vec![
        (1, MockPage::Ok(JOBS_PAGE)),
        (2, MockPage::Ok(MALFORMED_PAGE)),
    ])
    .await;
    let scraper = job_scraper(&source, 2, 0);

    let report = scraper
        .scrape_with_report(&["Python"], Some("São Paulo"))
        .await
        .unwrap();

    assert_eq!(report.pages_attempted, 2);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].target.page, 2);
    assert!(matches!(report.failures[0].error, PageError::Extraction(_)));

    let first = &report.records.records()[0];
    assert_eq!(first.value("title"), &FieldValue::text("Desenvolvedor Python Sênior"));
    assert_eq!(first.value("location"), &FieldValue::text("São Paulo, SP"));
    assert_eq!(first.value("posted_date"), &FieldValue::text("2024-03-15"));
    assert_eq!(
        first.value("url"),
        &FieldValue::text(format!("{}/vaga/101", source.base_url))
    );

    let second = &report.records.records()[1];
    assert!(second.value("salary").is_null());
    assert_eq!(second.value("location"), &FieldValue::text("São Paulo"));

    // term and scope arrive decoded
    let queries = source.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries.iter().all(|q| q["q"] == "Python" && q["local"] == "São Paulo"));
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let source = MockSource::start(vec![(1, MockPage::Ok(JOBS_PAGE))]).await;
    let scraper = job_scraper(&source, 1, 0);
    let terms: Vec<String> = Vec::new();

    let result = scraper.scrape(&terms, Some("São Paulo")).await;

    assert!(matches!(result, Err(ConfigurationError::EmptyQuery)));
    assert_eq!(source.hits(), 0);
}

#[tokio::test]
async fn test_failing_page_is_retried_then_skipped() {
    let source = MockSource::start(vec![
        (1, MockPage::Ok(JOBS_PAGE)),
        (2, MockPage::Status(503)),
    ])
    .await;
    let scraper = job_scraper(&source, 2, 2);

    let report = scraper
        .scrape_with_report(&["Python"], Some("Campinas"))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(source.hits(), 1 + 3);
    match &report.failures[0].error {
        PageError::Fetch(FetchError::Exhausted { attempts, .. }) => assert_eq!(*attempts, 3),
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn test_scrape_save_and_analyze() {
    let source = MockSource::start(vec![(1, MockPage::Ok(JOBS_PAGE))]).await;
    let scraper = job_scraper(&source, 1, 0);
    let dir = tempfile::tempdir().unwrap();
    let storage = RecordStorage::new(dir.path());

    let records = scraper.scrape(&["Python"], Some("São Paulo")).await.unwrap();
    let path = storage.save(&records, "jobs_data", OutputFormat::Sqlite).await.unwrap();

    assert_eq!(storage.load(&path, OutputFormat::Sqlite).await.unwrap(), records);

    let analysis = DataAnalyzer::new(&records).analyze_text_field("title");
    assert_eq!(analysis.total_entries, 2);
    assert_eq!(analysis.top_words[0].word, "desenvolvedor");
    assert_eq!(analysis.top_words[0].count, 2);
    assert_eq!(analysis.top_words[1].word, "python");
}
