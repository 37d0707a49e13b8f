// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{NewsArticle, SourceKind};
use crate::domain::models::record::Record;
use crate::extractors::{collect_listings, parse_selector, Extractor, FieldRule, PageContext};
use crate::utils::errors::{ConfigurationError, ExtractionError};
use scraper::{Html, Selector};
use serde::Deserialize;

/// 新闻页面选择器
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewsSelectors {
    pub container: String,
    pub title: String,
    pub source: String,
    pub author: String,
    pub published_date: String,
    pub topic: String,
    pub summary: String,
    pub url: String,
}

impl Default for NewsSelectors {
    fn default() -> Self {
        Self {
            container: "article, .news-item".to_string(),
            title: ".headline, h1, h2, h3".to_string(),
            source: ".source, .fonte".to_string(),
            author: ".author, .autor, [rel=author]".to_string(),
            published_date: "time, .published".to_string(),
            topic: ".topic, .tag".to_string(),
            summary: ".summary, .resumo, p".to_string(),
            url: "a[href]@href".to_string(),
        }
    }
}

/// 详情页必须命中的标志字段之一
const DETAIL_MARKERS: &[&str] = &["source", "author"];

/// 新闻提取器
#[derive(Debug, Clone)]
pub struct NewsExtractor {
    container: Selector,
    title: FieldRule,
    source: FieldRule,
    author: FieldRule,
    published_date: FieldRule,
    topic: FieldRule,
    summary: FieldRule,
    url: FieldRule,
}

impl NewsExtractor {
    pub fn new(selectors: &NewsSelectors) -> Result<Self, ConfigurationError> {
        Ok(Self {
            container: parse_selector("container", &selectors.container)?,
            title: FieldRule::parse("title", &selectors.title)?,
            source: FieldRule::parse("source", &selectors.source)?,
            author: FieldRule::parse("author", &selectors.author)?,
            published_date: FieldRule::parse("published_date", &selectors.published_date)?,
            topic: FieldRule::parse("topic", &selectors.topic)?,
            summary: FieldRule::parse("summary", &selectors.summary)?,
            url: FieldRule::parse("url", &selectors.url)?,
        })
    }
}

impl Extractor for NewsExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    fn extract(&self, document: &Html, context: &PageContext) -> Result<Vec<Record>, ExtractionError> {
        collect_listings(document, &self.container, DETAIL_MARKERS, context, |listing| {
            let title = listing.text(&self.title);
            let source = listing.text(&self.source);
            let author = listing.text(&self.author);
            let published_date = listing.date(&self.published_date);
            let topic = listing
                .text(&self.topic)
                .or_else(|| Some(listing.context().term.clone()));
            NewsArticle {
                title,
                source,
                author,
                published_date,
                topic,
                summary: listing.text(&self.summary),
                url: listing.link(&self.url),
            }
        })
    }
}
