// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 字段提取模块
//!
//! 将解析后的 HTML 文档映射为有序记录：
//! - 容器选择器匹配到的每个元素是一条列表项
//! - 容器未匹配时整个文档视为单条（详情页），详情页必须命中至少一个该数据源的标志字段
//! - 单个字段缺失记为 `Null`，不影响其余字段

pub mod job;
pub mod news;
pub mod product;

use crate::domain::models::listing::SourceKind;
use crate::domain::models::record::Record;
use crate::utils::errors::{ConfigurationError, ExtractionError};
use crate::utils::text_processing::{collapse_whitespace, parse_decimal, parse_integer};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// 页面上下文
///
/// 提取时可用的非文档信息，用于解析相对链接和字段回退
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    /// 页面URL
    pub url: String,
    /// 当前查询词
    pub term: String,
    /// 查询范围（例如职位地点）
    pub scope: Option<String>,
}

impl PageContext {
    pub fn new(url: impl Into<String>, term: impl Into<String>, scope: Option<String>) -> Self {
        Self {
            url: url.into(),
            term: term.into(),
            scope,
        }
    }
}

/// 字段提取器
///
/// 对同一文档的提取是纯函数，不发起网络请求
pub trait Extractor: Send + Sync {
    /// 数据源类型
    fn kind(&self) -> SourceKind;

    /// 从文档中提取记录
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<Record>)` - 至少一条包含文档字段的记录
    /// * `Err(ExtractionError::NoFields)` - 页面中没有任何可提取的字段
    fn extract(&self, document: &Html, context: &PageContext) -> Result<Vec<Record>, ExtractionError>;
}

/// 字段规则
///
/// 写法为 `css` 或 `css@attribute`；没有属性时读取元素的文本
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: String,
    selector: Selector,
    attribute: Option<String>,
}

impl FieldRule {
    /// 解析字段规则
    ///
    /// # 参数
    ///
    /// * `field` - 字段名，仅用于错误信息
    /// * `rule` - 规则字符串
    pub fn parse(field: &str, rule: &str) -> Result<Self, ConfigurationError> {
        let (css, attribute) = split_attribute(rule);
        let selector = parse_selector(field, css)?;
        Ok(Self {
            field: field.to_string(),
            selector,
            attribute: attribute.map(str::to_string),
        })
    }

    /// 规则对应的字段名
    pub fn field(&self) -> &str {
        &self.field
    }

    /// 作用域内第一个匹配元素
    fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.selector).next()
    }

    /// 读取元素的属性或折叠后的文本，空白视为缺失
    fn read(&self, element: ElementRef<'_>) -> Option<String> {
        let raw = match &self.attribute {
            Some(attribute) => element.value().attr(attribute)?.to_string(),
            None => element.text().collect::<String>(),
        };
        let value = collapse_whitespace(&raw);
        (!value.is_empty()).then_some(value)
    }
}

/// 解析 CSS 选择器
pub(crate) fn parse_selector(field: &str, css: &str) -> Result<Selector, ConfigurationError> {
    if css.trim().is_empty() {
        return Err(ConfigurationError::InvalidSelector {
            field: field.to_string(),
            reason: "empty selector".to_string(),
        });
    }
    Selector::parse(css).map_err(|e| ConfigurationError::InvalidSelector {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

fn split_attribute(rule: &str) -> (&str, Option<&str>) {
    match rule.rsplit_once('@') {
        Some((css, attribute))
            if !attribute.is_empty()
                && attribute
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            (css.trim(), Some(attribute))
        }
        _ => (rule.trim(), None),
    }
}

/// 单条列表项的读取器
///
/// 统计来自文档的字段数，回退值不计入
pub(crate) struct Listing<'a> {
    element: ElementRef<'a>,
    context: &'a PageContext,
    markers: &'a [&'a str],
    detail_page: bool,
    found: usize,
    marked: usize,
}

impl<'a> Listing<'a> {
    fn record<T>(&mut self, rule: &FieldRule, value: Option<T>) -> Option<T> {
        if value.is_some() {
            self.found += 1;
            if self.markers.iter().any(|marker| *marker == rule.field()) {
                self.marked += 1;
            }
        }
        value
    }

    /// 是否保留该列表项
    fn accepted(&self) -> bool {
        if self.detail_page {
            self.marked > 0
        } else {
            self.found > 0
        }
    }

    pub(crate) fn context(&self) -> &PageContext {
        self.context
    }

    /// 文本字段
    pub(crate) fn text(&mut self, rule: &FieldRule) -> Option<String> {
        let value = rule.first(self.element).and_then(|el| rule.read(el));
        self.record(rule, value)
    }

    /// 链接字段，相对地址按页面URL解析；详情页缺失时回退为页面URL
    pub(crate) fn link(&mut self, rule: &FieldRule) -> Option<String> {
        let value = rule
            .first(self.element)
            .and_then(|el| rule.read(el))
            .and_then(|href| resolve_href(&self.context.url, &href));
        let value = self.record(rule, value);
        value.or_else(|| self.detail_page.then(|| self.context.url.clone()))
    }

    /// 日期字段，优先读取 `datetime` 属性
    pub(crate) fn date(&mut self, rule: &FieldRule) -> Option<String> {
        let value = rule.first(self.element).and_then(|el| {
            el.value()
                .attr("datetime")
                .map(collapse_whitespace)
                .filter(|v| !v.is_empty())
                .or_else(|| rule.read(el))
                .map(|raw| normalize_date(&raw))
        });
        self.record(rule, value)
    }

    /// 小数字段（价格、评分）
    pub(crate) fn decimal(&mut self, rule: &FieldRule) -> Option<f64> {
        let value = rule
            .first(self.element)
            .and_then(|el| rule.read(el))
            .and_then(|raw| parse_decimal(&raw));
        self.record(rule, value)
    }

    /// 整数字段（评论数）
    pub(crate) fn integer(&mut self, rule: &FieldRule) -> Option<i64> {
        let value = rule
            .first(self.element)
            .and_then(|el| rule.read(el))
            .and_then(|raw| parse_integer(&raw));
        self.record(rule, value)
    }
}

/// 遍历容器匹配的列表项并构建记录
///
/// 没有任何来自文档字段的列表项被丢弃；整页都没有时返回 `NoFields`。
/// 容器未匹配时，只有命中 `detail_markers` 中至少一个字段的文档才算详情页，
/// 标题、链接这类页面通用元素不足以构成记录。
pub(crate) fn collect_listings<T, F>(
    document: &Html,
    container: &Selector,
    detail_markers: &[&str],
    context: &PageContext,
    mut build: F,
) -> Result<Vec<Record>, ExtractionError>
where
    T: Into<Record>,
    F: FnMut(&mut Listing<'_>) -> T,
{
    let mut elements: Vec<ElementRef<'_>> = document.select(container).collect();
    let detail_page = elements.is_empty();
    if detail_page {
        elements.push(document.root_element());
    }

    let mut records = Vec::with_capacity(elements.len());
    for element in elements {
        let mut listing = Listing {
            element,
            context,
            markers: detail_markers,
            detail_page,
            found: 0,
            marked: 0,
        };
        let item = build(&mut listing);
        if listing.accepted() {
            records.push(item.into());
        }
    }

    if records.is_empty() {
        return Err(ExtractionError::NoFields {
            url: context.url.clone(),
        });
    }
    Ok(records)
}

/// 按页面URL解析链接
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    match Url::parse(base) {
        Ok(base) => base.join(href).ok().map(String::from),
        Err(_) => Url::parse(href).ok().map(String::from),
    }
}

/// 将常见日期写法规范为 `YYYY-MM-DD`，无法识别时原样返回
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return parsed.date_naive().format("%Y-%m-%d").to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return parsed.date().format("%Y-%m-%d").to_string();
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return parsed.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::record::FieldValue;

    #[test]
    fn test_rule_with_attribute() {
        let rule = FieldRule::parse("url", "a.job-link@href").unwrap();
        assert_eq!(rule.attribute.as_deref(), Some("href"));

        let rule = FieldRule::parse("title", "h2.title").unwrap();
        assert!(rule.attribute.is_none());
    }

    #[test]
    fn test_invalid_selector_is_configuration_error() {
        match FieldRule::parse("title", "div[[") {
            Err(ConfigurationError::InvalidSelector { field, .. }) => assert_eq!(field, "title"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(FieldRule::parse("title", "  ").is_err());
    }

    #[test]
    fn test_resolve_href() {
        let base = "https://vagas.example.com/busca?q=python&pagina=2";
        assert_eq!(
            resolve_href(base, "/vaga/42").as_deref(),
            Some("https://vagas.example.com/vaga/42")
        );
        assert_eq!(
            resolve_href(base, "https://outro.example.com/x").as_deref(),
            Some("https://outro.example.com/x")
        );
        assert_eq!(resolve_href(base, "#topo"), None);
        assert_eq!(resolve_href(base, ""), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-03-15T10:30:00-03:00"), "2024-03-15");
        assert_eq!(normalize_date("2024-03-15 08:00:00"), "2024-03-15");
        assert_eq!(normalize_date("15/03/2024"), "2024-03-15");
        assert_eq!(normalize_date("2024-03-15"), "2024-03-15");
        assert_eq!(normalize_date("há 2 dias"), "há 2 dias");
    }

    #[test]
    fn test_detail_page_uses_whole_document() {
        let html = Html::parse_document(
            "<html><body><h1> Vaga  Python </h1><span class=\"empresa\">Acme</span></body></html>",
        );
        let container = Selector::parse(".job-card").unwrap();
        let title = FieldRule::parse("title", "h1").unwrap();
        let company = FieldRule::parse("company", ".empresa").unwrap();
        let context = PageContext::new("https://vagas.example.com/vaga/1", "Python", None);

        let records = collect_listings(&html, &container, &["company"], &context, |listing| {
            Record::new()
                .with("title", listing.text(&title))
                .with("company", listing.text(&company))
        })
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("title"), &FieldValue::text("Vaga Python"));
    }

    #[test]
    fn test_detail_page_needs_a_marker_field() {
        let html = Html::parse_document(
            "<html><body><nav><a href=\"/\">Início</a></nav><h1>Página não encontrada</h1></body></html>",
        );
        let container = Selector::parse(".job-card").unwrap();
        let title = FieldRule::parse("title", "h1").unwrap();
        let url = FieldRule::parse("url", "a[href]@href").unwrap();
        let context = PageContext::new("https://vagas.example.com/busca?pagina=9", "Python", None);

        let result = collect_listings(&html, &container, &["company"], &context, |listing| {
            Record::new()
                .with("title", listing.text(&title))
                .with("url", listing.link(&url))
        });

        assert_eq!(
            result,
            Err(ExtractionError::NoFields {
                url: context.url.clone()
            })
        );
    }

    #[test]
    fn test_markers_do_not_apply_inside_containers() {
        let html = Html::parse_document("<div class=\"job-card\"><h2>Vaga Rust</h2></div>");
        let container = Selector::parse(".job-card").unwrap();
        let title = FieldRule::parse("title", "h2").unwrap();
        let context = PageContext::new("https://vagas.example.com/busca", "Rust", None);

        let records = collect_listings(&html, &container, &["company"], &context, |listing| {
            Record::new().with("title", listing.text(&title))
        })
        .unwrap();

        assert_eq!(records.len(), 1);
    }
}
