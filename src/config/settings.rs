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

use crate::extractors::job::JobSelectors;
use crate::extractors::news::NewsSelectors;
use crate::extractors::product::ProductSelectors;
use crate::utils::errors::{ConfigurationError, PersistenceError};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 抓取配置
    pub scraping: ScrapingConfig,
    /// 职位数据源
    pub jobs: SourceSettings,
    /// 电商数据源
    pub products: SourceSettings,
    /// 新闻数据源
    pub news: SourceSettings,
    /// 选择器覆盖
    #[serde(default)]
    pub selectors: SelectorSettings,
    /// 命令行运行参数
    pub run: RunSettings,
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Excel,
    Sqlite,
}

impl OutputFormat {
    /// 持久化文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Excel => "xlsx",
            OutputFormat::Sqlite => "db",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Excel => "excel",
            OutputFormat::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            "sqlite" | "db" => Ok(OutputFormat::Sqlite),
            other => Err(PersistenceError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 抓取配置
///
/// 每次运行创建一次，校验后只读共享给所有组件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScrapingConfig {
    /// 请求之间的最小间隔（秒）
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub delay: f64,
    /// 单次请求超时时间（秒）
    #[validate(range(min = 1))]
    pub timeout: u64,
    /// 失败后的最大重试次数
    pub max_retries: u32,
    /// 是否每次请求随机选择 User-Agent
    pub use_random_agent: bool,
    /// 输出格式
    pub output_format: OutputFormat,
    /// 输出目录
    #[validate(length(min = 1, message = "output_path cannot be empty"))]
    pub output_path: String,
    /// 重试退避基数（秒）
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub retry_backoff: f64,
    /// 重试退避上限（秒）
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub max_backoff: f64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay: 1.0,
            timeout: 10,
            max_retries: 3,
            use_random_agent: true,
            output_format: OutputFormat::Csv,
            output_path: "scraped_data".to_string(),
            retry_backoff: 1.0,
            max_backoff: 60.0,
        }
    }
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

impl ScrapingConfig {
    /// 校验配置并返回自身
    pub fn validated(self) -> Result<Self, ConfigurationError> {
        self.validate()?;
        if self.max_backoff < self.retry_backoff {
            return Err(ConfigurationError::Invalid(format!(
                "max_backoff ({}) must not be smaller than retry_backoff ({})",
                self.max_backoff, self.retry_backoff
            )));
        }
        Ok(self)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay.max(0.0))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff.max(0.0))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.max_backoff.max(0.0))
    }
}

/// 数据源配置
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct SourceSettings {
    /// URL模板，支持 `{term}`、`{scope}`、`{page}` 占位符
    #[validate(length(min = 1))]
    pub url_template: String,
    /// 每个查询词抓取的页数
    #[validate(range(min = 1))]
    pub max_pages: u32,
}

/// 各数据源的选择器覆盖
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    pub jobs: JobSelectors,
    pub products: ProductSelectors,
    pub news: NewsSelectors,
}

/// 命令行运行参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunSettings {
    pub job_terms: Vec<String>,
    pub job_location: String,
    pub product_categories: Vec<String>,
    pub news_topics: Vec<String>,
    /// 是否为每条记录追加 `scraped_at` 抓取时间
    #[serde(default)]
    pub record_scraped_at: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `HARVESTRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 校验通过的配置
    /// * `Err(ConfigurationError)` - 加载或校验失败
    pub fn new() -> Result<Self, ConfigurationError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let defaults = ScrapingConfig::default();
        let builder = Config::builder()
            // Scraping defaults
            .set_default("scraping.delay", defaults.delay)?
            .set_default("scraping.timeout", defaults.timeout as i64)?
            .set_default("scraping.max_retries", defaults.max_retries as i64)?
            .set_default("scraping.use_random_agent", defaults.use_random_agent)?
            .set_default("scraping.output_format", defaults.output_format.as_str())?
            .set_default("scraping.output_path", defaults.output_path)?
            .set_default("scraping.retry_backoff", defaults.retry_backoff)?
            .set_default("scraping.max_backoff", defaults.max_backoff)?
            // Source defaults
            .set_default(
                "jobs.url_template",
                "https://vagas.example.com/busca?q={term}&local={scope}&pagina={page}",
            )?
            .set_default("jobs.max_pages", 1)?
            .set_default(
                "products.url_template",
                "https://loja.example.com/categoria/{term}?pagina={page}",
            )?
            .set_default("products.max_pages", 1)?
            .set_default(
                "news.url_template",
                "https://noticias.example.com/busca?q={term}&pagina={page}",
            )?
            .set_default("news.max_pages", 1)?
            // Demo run defaults
            .set_default("run.job_terms", vec!["Python", "Django", "JavaScript"])?
            .set_default("run.job_location", "São Paulo")?
            .set_default(
                "run.product_categories",
                vec!["eletrônicos", "roupas", "casa"],
            )?
            .set_default("run.news_topics", vec!["Python", "IA", "Tecnologia"])?
            .set_default("run.record_scraped_at", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("HARVESTRS")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validated()
    }

    /// 校验所有配置节
    pub fn validated(self) -> Result<Self, ConfigurationError> {
        let scraping = self.scraping.validated()?;
        self.jobs.validate()?;
        self.products.validate()?;
        self.news.validate()?;
        Ok(Self { scraping, ..self })
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
