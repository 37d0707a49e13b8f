// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::{Product, SourceKind};
use crate::domain::models::record::Record;
use crate::extractors::{collect_listings, parse_selector, Extractor, FieldRule, PageContext};
use crate::utils::errors::{ConfigurationError, ExtractionError};
use scraper::{Html, Selector};
use serde::Deserialize;

/// 商品页面选择器
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductSelectors {
    pub container: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub rating: String,
    pub reviews_count: String,
    pub availability: String,
    pub brand: String,
    pub url: String,
}

impl Default for ProductSelectors {
    fn default() -> Self {
        Self {
            container: ".product-card, li.produto".to_string(),
            name: ".product-name, h1, h2".to_string(),
            category: ".category, .categoria".to_string(),
            price: ".price, .preco".to_string(),
            rating: ".rating, .avaliacao".to_string(),
            reviews_count: ".reviews, .reviews-count".to_string(),
            availability: ".availability, .estoque".to_string(),
            brand: ".brand, .marca".to_string(),
            url: "a[href]@href".to_string(),
        }
    }
}

/// 详情页必须命中的标志字段之一
const DETAIL_MARKERS: &[&str] = &["price", "rating", "reviews_count", "availability", "brand"];

/// 商品提取器
///
/// 价格与评分解析为小数，评论数解析为整数
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    container: Selector,
    name: FieldRule,
    category: FieldRule,
    price: FieldRule,
    rating: FieldRule,
    reviews_count: FieldRule,
    availability: FieldRule,
    brand: FieldRule,
    url: FieldRule,
}

impl ProductExtractor {
    pub fn new(selectors: &ProductSelectors) -> Result<Self, ConfigurationError> {
        Ok(Self {
            container: parse_selector("container", &selectors.container)?,
            name: FieldRule::parse("name", &selectors.name)?,
            category: FieldRule::parse("category", &selectors.category)?,
            price: FieldRule::parse("price", &selectors.price)?,
            rating: FieldRule::parse("rating", &selectors.rating)?,
            reviews_count: FieldRule::parse("reviews_count", &selectors.reviews_count)?,
            availability: FieldRule::parse("availability", &selectors.availability)?,
            brand: FieldRule::parse("brand", &selectors.brand)?,
            url: FieldRule::parse("url", &selectors.url)?,
        })
    }
}

impl Extractor for ProductExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Products
    }

    fn extract(&self, document: &Html, context: &PageContext) -> Result<Vec<Record>, ExtractionError> {
        collect_listings(document, &self.container, DETAIL_MARKERS, context, |listing| {
            let name = listing.text(&self.name);
            let category = listing
                .text(&self.category)
                .or_else(|| Some(listing.context().term.clone()));
            Product {
                name,
                category,
                price: listing.decimal(&self.price),
                rating: listing.decimal(&self.rating),
                reviews_count: listing.integer(&self.reviews_count),
                availability: listing.text(&self.availability),
                brand: listing.text(&self.brand),
                url: listing.link(&self.url),
            }
        })
    }
}
