// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use harvestrs::config::settings::Settings;
use harvestrs::domain::models::record::RecordSet;
use harvestrs::domain::services::analyzer::DataAnalyzer;
use harvestrs::domain::services::scrape_service::{EcommerceScraper, JobScraper, NewsScraper};
use harvestrs::engines::retrying_fetcher::RetryingFetcher;
use harvestrs::infrastructure::storage::RecordStorage;
use harvestrs::utils::telemetry;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 依次抓取职位、商品和新闻，保存结果并输出分析摘要
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting harvestrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    let run = &settings.run;
    let format = settings.scraping.output_format;
    info!(format = %format, output = %settings.scraping.output_path, "Configuration loaded");

    // 3. Shared fetcher: one rate limiter for every source
    let fetcher = Arc::new(RetryingFetcher::from_config(&settings.scraping)?);
    let storage = RecordStorage::from_config(&settings.scraping);

    // 4. Scrape
    let jobs = JobScraper::jobs(fetcher.clone(), &settings)?
        .scrape(&run.job_terms, Some(run.job_location.as_str()))
        .await?;
    storage.save(&jobs, "jobs_data", format).await?;

    let products = EcommerceScraper::products(fetcher.clone(), &settings)?
        .scrape(&run.product_categories, None)
        .await?;
    storage.save(&products, "products_data", format).await?;

    let news = NewsScraper::news(fetcher, &settings)?
        .scrape(&run.news_topics, None)
        .await?;
    storage.save(&news, "news_data", format).await?;

    // 5. Analysis
    summarize("jobs", &jobs, "title");
    summarize("products", &products, "name");
    summarize("news", &news, "title");

    info!(
        total = jobs.len() + products.len() + news.len(),
        output = %storage.output_dir().display(),
        "Scraping finished"
    );
    Ok(())
}

fn summarize(source: &str, records: &RecordSet, text_field: &str) {
    let analyzer = DataAnalyzer::new(records);
    let stats = analyzer.basic_stats();
    info!(source, records = stats.total_records, fields = stats.fields.len(), "Collected records");

    if records.is_empty() {
        return;
    }
    let text = analyzer.analyze_text_field(text_field);
    let top: Vec<String> = text
        .top_words
        .iter()
        .take(5)
        .map(|w| format!("{} ({})", w.word, w.count))
        .collect();
    info!(
        source,
        field = text_field,
        average_length = %format!("{:.1}", text.average_length),
        top_words = %top.join(", "),
        "Text analysis"
    );
}
