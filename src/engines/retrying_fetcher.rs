// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapingConfig;
use crate::engines::rate_limiter::RateLimiter;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{ScrapeRequest, ScraperEngine};
use crate::engines::user_agent::{FixedUserAgent, RandomUserAgents, UserAgentProvider};
use crate::utils::errors::{AttemptFailure, ConfigurationError, FetchError};
use crate::utils::retry_policy::RetryPolicy;
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// 抓取结果
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// 请求的URL
    pub url: String,
    /// 跟随重定向后的URL
    pub final_url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub body: String,
    /// 实际尝试次数
    pub attempts: u32,
}

/// 带重试的抓取器
///
/// 每次尝试前经过速率限制器；网络错误与非 2xx 状态按指数退避重试，
/// 共尝试 `max_retries + 1` 次
pub struct RetryingFetcher {
    engine: Arc<dyn ScraperEngine>,
    limiter: RateLimiter,
    agents: Arc<dyn UserAgentProvider>,
    policy: RetryPolicy,
    timeout: Duration,
    headers: HashMap<String, String>,
}

impl RetryingFetcher {
    /// 使用指定引擎创建抓取器
    ///
    /// `use_random_agent` 决定使用随机池还是固定 User-Agent
    pub fn new(engine: Arc<dyn ScraperEngine>, config: &ScrapingConfig) -> Self {
        let agents: Arc<dyn UserAgentProvider> = if config.use_random_agent {
            Arc::new(RandomUserAgents::new())
        } else {
            Arc::new(FixedUserAgent::default())
        };

        Self {
            engine,
            limiter: RateLimiter::new(config.delay()),
            agents,
            policy: RetryPolicy::from_config(config),
            timeout: config.timeout(),
            headers: default_headers(),
        }
    }

    /// 使用 reqwest 引擎创建抓取器
    pub fn from_config(config: &ScrapingConfig) -> Result<Self, ConfigurationError> {
        let engine = ReqwestEngine::new()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;
        Ok(Self::new(Arc::new(engine), config))
    }

    /// 替换 User-Agent 提供者
    pub fn with_user_agents(mut self, agents: Arc<dyn UserAgentProvider>) -> Self {
        self.agents = agents;
        self
    }

    /// 替换速率限制器（例如多个抓取器共享同一个限制器）
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// 抓取URL
    ///
    /// # 参数
    ///
    /// * `url` - 绝对 http(s) URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResult)` - 成功响应
    /// * `Err(FetchError)` - URL无效或重试耗尽
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let target = parse_target(url)?;
        let max_attempts = self.policy.max_attempts();
        let mut last = AttemptFailure::Network("no attempt made".to_string());

        for attempt in 0..max_attempts {
            self.limiter.wait().await;

            let number = attempt + 1;
            let mut request = ScrapeRequest::new(target.as_str(), self.timeout);
            request.headers = self.headers.clone();
            request.user_agent = Some(self.agents.next_agent());

            match self.engine.scrape(&request).await {
                Ok(response) if response.is_success() => {
                    debug!(
                        url,
                        attempt = number,
                        status = response.status_code,
                        elapsed_ms = response.response_time_ms,
                        engine = self.engine.name(),
                        "Fetch succeeded"
                    );
                    counter!("harvestrs_fetch_attempts_total", "outcome" => "success").increment(1);
                    return Ok(FetchResult {
                        url: url.to_string(),
                        final_url: response.final_url,
                        status_code: response.status_code,
                        body: response.content,
                        attempts: number,
                    });
                }
                Ok(response) => {
                    warn!(
                        url,
                        attempt = number,
                        status = response.status_code,
                        "Fetch attempt returned non-success status"
                    );
                    last = AttemptFailure::Status(response.status_code);
                }
                Err(e) => {
                    warn!(url, attempt = number, error = %e, "Fetch attempt failed");
                    last = AttemptFailure::Network(e.to_string());
                }
            }
            counter!("harvestrs_fetch_attempts_total", "outcome" => "failure").increment(1);

            if self.policy.should_retry(attempt) {
                let backoff = self.policy.calculate_backoff(attempt);
                debug!(url, attempt = number, backoff_ms = backoff.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(backoff).await;
            }
        }

        error!(url, attempts = max_attempts, last = %last, "Giving up after exhausting retries");
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last,
        })
    }
}

fn parse_target(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {}", scheme),
        }),
    }
}

fn default_headers() -> HashMap<String, String> {
    HashMap::from([
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        (
            "Accept-Language".to_string(),
            "pt-BR,pt;q=0.9,en;q=0.8".to_string(),
        ),
    ])
}

#[cfg(test)]
#[path = "retrying_fetcher_test.rs"]
mod tests;
