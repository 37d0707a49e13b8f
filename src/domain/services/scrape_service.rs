// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{Settings, SourceSettings};
use crate::domain::models::record::{Record, RecordSet};
use crate::engines::retrying_fetcher::RetryingFetcher;
use crate::extractors::job::JobExtractor;
use crate::extractors::news::NewsExtractor;
use crate::extractors::product::ProductExtractor;
use crate::extractors::{Extractor, PageContext};
use crate::utils::errors::{ConfigurationError, ExtractionError, FetchError};
use chrono::{SecondsFormat, Utc};
use metrics::counter;
use scraper::Html;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use url::Url;

/// 职位抓取器
pub type JobScraper = ScrapeService<JobExtractor>;
/// 电商抓取器
pub type EcommerceScraper = ScrapeService<ProductExtractor>;
/// 新闻抓取器
pub type NewsScraper = ScrapeService<NewsExtractor>;

/// 待抓取的页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTarget {
    pub url: String,
    pub term: String,
    pub page: u32,
}

/// 单页失败原因
#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// 被跳过的页面
#[derive(Debug)]
pub struct PageFailure {
    pub target: ScrapeTarget,
    pub error: PageError,
}

/// 抓取报告
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// 按抓取顺序汇总的记录
    pub records: RecordSet,
    /// 尝试过的页面数
    pub pages_attempted: usize,
    /// 被跳过的页面
    pub failures: Vec<PageFailure>,
}

/// 抓取编排服务
///
/// 按查询词和页码生成目标URL，逐页抓取、解析、提取并汇总。
/// 单页失败只记录并跳过，配置错误在任何网络请求之前返回。
pub struct ScrapeService<E: Extractor> {
    fetcher: Arc<RetryingFetcher>,
    extractor: E,
    source: SourceSettings,
    span: Span,
    stamp_records: bool,
}

impl<E: Extractor> ScrapeService<E> {
    pub fn new(fetcher: Arc<RetryingFetcher>, extractor: E, source: SourceSettings) -> Self {
        let span = info_span!("scraper", source = %extractor.kind());
        Self {
            fetcher,
            extractor,
            source,
            span,
            stamp_records: false,
        }
    }

    /// 替换日志上下文
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// 为每条记录追加 `scraped_at`（页面抓取完成时的 UTC 时间，RFC 3339）
    pub fn with_scraped_at(mut self, enabled: bool) -> Self {
        self.stamp_records = enabled;
        self
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// 生成全部目标URL
    ///
    /// 对每个查询词依次生成第 `1..=max_pages` 页，`{term}` 与 `{scope}` 经过URL编码
    ///
    /// # Errors
    ///
    /// * `EmptyQuery` - 查询词列表为空或包含空白查询词
    /// * `Invalid` - `max_pages` 为 0
    /// * `InvalidTemplate` - 模板渲染后不是有效的 http(s) URL
    pub fn build_targets<S: AsRef<str>>(
        &self,
        terms: &[S],
        scope: Option<&str>,
    ) -> Result<Vec<ScrapeTarget>, ConfigurationError> {
        if terms.is_empty() || terms.iter().any(|t| t.as_ref().trim().is_empty()) {
            return Err(ConfigurationError::EmptyQuery);
        }
        if self.source.max_pages == 0 {
            return Err(ConfigurationError::Invalid(
                "max_pages must be at least 1".to_string(),
            ));
        }

        let encoded_scope = urlencoding::encode(scope.unwrap_or_default().trim()).into_owned();
        let mut targets = Vec::with_capacity(terms.len() * self.source.max_pages as usize);
        for term in terms {
            let term = term.as_ref().trim();
            let encoded_term = urlencoding::encode(term);
            for page in 1..=self.source.max_pages {
                let url = self
                    .source
                    .url_template
                    .replace("{term}", &encoded_term)
                    .replace("{scope}", &encoded_scope)
                    .replace("{page}", &page.to_string());
                validate_target(&self.source.url_template, &url)?;
                targets.push(ScrapeTarget {
                    url,
                    term: term.to_string(),
                    page,
                });
            }
        }
        Ok(targets)
    }

    /// 抓取并返回记录集
    pub async fn scrape<S: AsRef<str>>(
        &self,
        terms: &[S],
        scope: Option<&str>,
    ) -> Result<RecordSet, ConfigurationError> {
        Ok(self.scrape_with_report(terms, scope).await?.records)
    }

    /// 抓取并返回包含失败页面的报告
    pub async fn scrape_with_report<S: AsRef<str>>(
        &self,
        terms: &[S],
        scope: Option<&str>,
    ) -> Result<ScrapeReport, ConfigurationError> {
        let targets = self.build_targets(terms, scope)?;
        let scope = scope.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Ok(self.run(targets, scope).instrument(self.span.clone()).await)
    }

    async fn run(&self, targets: Vec<ScrapeTarget>, scope: Option<String>) -> ScrapeReport {
        let kind = self.extractor.kind();
        let mut report = ScrapeReport::default();
        info!(pages = targets.len(), "Starting scrape");

        for target in targets {
            report.pages_attempted += 1;
            match self.scrape_page(&target, scope.as_deref()).await {
                Ok(records) => {
                    debug!(url = %target.url, records = records.len(), "Page extracted");
                    counter!("harvestrs_pages_total", "source" => kind.as_str(), "outcome" => "success")
                        .increment(1);
                    report.records.extend(records);
                }
                Err(error) => {
                    warn!(url = %target.url, term = %target.term, page = target.page, error = %error, "Skipping page");
                    counter!("harvestrs_pages_total", "source" => kind.as_str(), "outcome" => "skipped")
                        .increment(1);
                    report.failures.push(PageFailure { target, error });
                }
            }
        }

        info!(
            records = report.records.len(),
            pages = report.pages_attempted,
            skipped = report.failures.len(),
            "Scrape finished"
        );
        report
    }

    async fn scrape_page(
        &self,
        target: &ScrapeTarget,
        scope: Option<&str>,
    ) -> Result<Vec<Record>, PageError> {
        let fetched = self.fetcher.fetch(&target.url).await?;
        let context = PageContext::new(
            fetched.final_url,
            target.term.clone(),
            scope.map(str::to_string),
        );
        let document = Html::parse_document(&fetched.body);
        let records = self.extractor.extract(&document, &context)?;
        if !self.stamp_records {
            return Ok(records);
        }

        let scraped_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Ok(records
            .into_iter()
            .map(|record| record.with("scraped_at", scraped_at.as_str()))
            .collect())
    }
}

impl JobScraper {
    /// 使用配置中的职位数据源和选择器
    pub fn jobs(fetcher: Arc<RetryingFetcher>, settings: &Settings) -> Result<Self, ConfigurationError> {
        let extractor = JobExtractor::new(&settings.selectors.jobs)?;
        Ok(Self::new(fetcher, extractor, settings.jobs.clone())
            .with_scraped_at(settings.run.record_scraped_at))
    }
}

impl EcommerceScraper {
    /// 使用配置中的商品数据源和选择器
    pub fn products(fetcher: Arc<RetryingFetcher>, settings: &Settings) -> Result<Self, ConfigurationError> {
        let extractor = ProductExtractor::new(&settings.selectors.products)?;
        Ok(Self::new(fetcher, extractor, settings.products.clone())
            .with_scraped_at(settings.run.record_scraped_at))
    }
}

impl NewsScraper {
    /// 使用配置中的新闻数据源和选择器
    pub fn news(fetcher: Arc<RetryingFetcher>, settings: &Settings) -> Result<Self, ConfigurationError> {
        let extractor = NewsExtractor::new(&settings.selectors.news)?;
        Ok(Self::new(fetcher, extractor, settings.news.clone())
            .with_scraped_at(settings.run.record_scraped_at))
    }
}

fn validate_target(template: &str, url: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        scheme => Err(invalid(format!("unsupported target {}://", scheme))),
    }
}

#[cfg(test)]
#[path = "scrape_service_test.rs"]
mod tests;
