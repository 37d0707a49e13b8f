// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{JobPosting, SourceKind};
use crate::domain::models::record::Record;
use crate::extractors::{collect_listings, parse_selector, Extractor, FieldRule, PageContext};
use crate::utils::errors::{ConfigurationError, ExtractionError};
use scraper::{Html, Selector};
use serde::Deserialize;

/// 职位页面选择器
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JobSelectors {
    pub container: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub requirements: String,
    pub posted_date: String,
    pub url: String,
}

impl Default for JobSelectors {
    fn default() -> Self {
        Self {
            container: ".job-card, article.vaga".to_string(),
            title: ".job-title, h1, h2".to_string(),
            company: ".company, .empresa".to_string(),
            location: ".location, .local".to_string(),
            salary: ".salary, .salario".to_string(),
            requirements: ".requirements, .requisitos".to_string(),
            posted_date: "time, .posted-date".to_string(),
            url: "a[href]@href".to_string(),
        }
    }
}

/// 详情页必须命中的标志字段之一
const DETAIL_MARKERS: &[&str] = &["company", "location", "salary", "requirements"];

/// 职位提取器
#[derive(Debug, Clone)]
pub struct JobExtractor {
    container: Selector,
    title: FieldRule,
    company: FieldRule,
    location: FieldRule,
    salary: FieldRule,
    requirements: FieldRule,
    posted_date: FieldRule,
    url: FieldRule,
}

impl JobExtractor {
    pub fn new(selectors: &JobSelectors) -> Result<Self, ConfigurationError> {
        Ok(Self {
            container: parse_selector("container", &selectors.container)?,
            title: FieldRule::parse("title", &selectors.title)?,
            company: FieldRule::parse("company", &selectors.company)?,
            location: FieldRule::parse("location", &selectors.location)?,
            salary: FieldRule::parse("salary", &selectors.salary)?,
            requirements: FieldRule::parse("requirements", &selectors.requirements)?,
            posted_date: FieldRule::parse("posted_date", &selectors.posted_date)?,
            url: FieldRule::parse("url", &selectors.url)?,
        })
    }
}

impl Extractor for JobExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Jobs
    }

    fn extract(&self, document: &Html, context: &PageContext) -> Result<Vec<Record>, ExtractionError> {
        collect_listings(document, &self.container, DETAIL_MARKERS, context, |listing| {
            let title = listing.text(&self.title);
            let company = listing.text(&self.company);
            let location = listing
                .text(&self.location)
                .or_else(|| listing.context().scope.clone());
            JobPosting {
                title,
                company,
                location,
                salary: listing.text(&self.salary),
                requirements: listing.text(&self.requirements),
                posted_date: listing.date(&self.posted_date),
                url: listing.link(&self.url),
            }
        })
    }
}
