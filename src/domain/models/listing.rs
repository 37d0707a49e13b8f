// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{FieldKind, Record, RecordSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// 职位
    Jobs,
    /// 电商商品
    Products,
    /// 新闻
    News,
}

impl SourceKind {
    /// 该数据源记录的固定字段顺序
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            SourceKind::Jobs => &[
                "title",
                "company",
                "location",
                "salary",
                "requirements",
                "posted_date",
                "url",
            ],
            SourceKind::Products => &[
                "name",
                "category",
                "price",
                "rating",
                "reviews_count",
                "availability",
                "brand",
                "url",
            ],
            SourceKind::News => &[
                "title",
                "source",
                "author",
                "published_date",
                "topic",
                "summary",
                "url",
            ],
        }
    }

    /// 字段的声明类型，不属于该数据源的字段返回 `None`
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        if !self.schema().iter().any(|field| *field == name) {
            return None;
        }
        Some(match (self, name) {
            (SourceKind::Products, "price" | "rating") => FieldKind::Float,
            (SourceKind::Products, "reviews_count") => FieldKind::Integer,
            _ => FieldKind::Text,
        })
    }

    /// 按字段声明类型修正读回的记录集，未声明的字段保持原值
    pub fn conform(&self, records: RecordSet) -> RecordSet {
        records
            .into_vec()
            .into_iter()
            .map(|record| {
                record
                    .iter()
                    .map(|(name, value)| {
                        let value = match self.field_kind(name) {
                            Some(kind) => value.clone().conform(kind),
                            None => value.clone(),
                        };
                        (name.to_string(), value)
                    })
                    .collect::<Record>()
            })
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Jobs => "jobs",
            SourceKind::Products => "products",
            SourceKind::News => "news",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 职位信息
///
/// 所有字段均为文本，薪资保留原始描述不做数值解析
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub requirements: Option<String>,
    pub posted_date: Option<String>,
    pub url: Option<String>,
}

/// 商品信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub reviews_count: Option<i64>,
    pub availability: Option<String>,
    pub brand: Option<String>,
    pub url: Option<String>,
}

/// 新闻文章
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub topic: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

impl From<JobPosting> for Record {
    fn from(job: JobPosting) -> Self {
        Record::new()
            .with("title", job.title)
            .with("company", job.company)
            .with("location", job.location)
            .with("salary", job.salary)
            .with("requirements", job.requirements)
            .with("posted_date", job.posted_date)
            .with("url", job.url)
    }
}

impl From<Product> for Record {
    fn from(product: Product) -> Self {
        Record::new()
            .with("name", product.name)
            .with("category", product.category)
            .with("price", product.price)
            .with("rating", product.rating)
            .with("reviews_count", product.reviews_count)
            .with("availability", product.availability)
            .with("brand", product.brand)
            .with("url", product.url)
    }
}

impl From<NewsArticle> for Record {
    fn from(article: NewsArticle) -> Self {
        Record::new()
            .with("title", article.title)
            .with("source", article.source)
            .with("author", article.author)
            .with("published_date", article.published_date)
            .with("topic", article.topic)
            .with("summary", article.summary)
            .with("url", article.url)
    }
}
