// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScrapingConfig;
use std::time::Duration;

/// 重试策略配置
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最大重试次数
    pub max_retries: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 根据抓取配置创建重试策略
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.retry_backoff(),
            max_backoff: config.max_backoff(),
            ..Self::default()
        }
    }

    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// 总尝试次数（首次请求加重试）
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// 计算第 `attempt` 次失败后的退避时间（从 0 开始）
    ///
    /// `initial_backoff * multiplier^attempt`，不超过 `max_backoff`，
    /// 因此序列单调不减
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let backoff_secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else if capped > 0.0 {
            self.max_backoff
        } else {
            Duration::ZERO
        }
    }

    /// 是否应该重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff_exponential() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.calculate_backoff(0), Duration::from_secs(1));
        assert_eq!(policy.calculate_backoff(1), Duration::from_secs(2)); // 1 * 2^1
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(4)); // 1 * 2^2
    }

    #[test]
    fn test_calculate_backoff_max_limit() {
        let policy = RetryPolicy {
            max_backoff: Duration::from_secs(5),
            ..RetryPolicy::default()
        };

        assert_eq!(policy.calculate_backoff(10), Duration::from_secs(5));
        assert_eq!(policy.calculate_backoff(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_is_non_decreasing() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(3),
            ..RetryPolicy::default()
        };

        let delays: Vec<_> = (0..12).map(|a| policy.calculate_backoff(a)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_zero_base_never_sleeps() {
        let policy = RetryPolicy {
            initial_backoff: Duration::ZERO,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.calculate_backoff(3), Duration::ZERO);
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();

        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3)); // max_retries = 3
        assert_eq!(policy.max_attempts(), 4);
        assert!(!RetryPolicy::none().should_retry(0));
    }

    #[test]
    fn test_from_config() {
        let config = ScrapingConfig {
            max_retries: 5,
            retry_backoff: 0.5,
            max_backoff: 8.0,
            ..ScrapingConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(500));
        assert_eq!(policy.calculate_backoff(10), Duration::from_secs(8));
    }
}
