// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::atomic::{AtomicUsize, Ordering};

/// 未启用随机 User-Agent 时使用的固定值
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// User-Agent 提供者
///
/// 每次请求调用一次 `next_agent`
pub trait UserAgentProvider: Send + Sync {
    fn next_agent(&self) -> String;
}

/// 从内置池中均匀随机选择，不保证不重复
#[derive(Debug, Clone)]
pub struct RandomUserAgents {
    pool: Vec<String>,
}

impl RandomUserAgents {
    pub fn new() -> Self {
        Self::with_pool(DESKTOP_USER_AGENTS.iter().map(|s| s.to_string()).collect())
    }

    /// 使用自定义池；空池退回默认值
    pub fn with_pool(pool: Vec<String>) -> Self {
        if pool.is_empty() {
            return Self {
                pool: vec![DEFAULT_USER_AGENT.to_string()],
            };
        }
        Self { pool }
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }
}

impl Default for RandomUserAgents {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAgentProvider for RandomUserAgents {
    fn next_agent(&self) -> String {
        self.pool[rand::random_range(0..self.pool.len())].clone()
    }
}

/// 固定 User-Agent
#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl Default for FixedUserAgent {
    fn default() -> Self {
        Self(DEFAULT_USER_AGENT.to_string())
    }
}

impl UserAgentProvider for FixedUserAgent {
    fn next_agent(&self) -> String {
        self.0.clone()
    }
}

/// 按顺序循环返回的 User-Agent 序列，结果可预测
#[derive(Debug)]
pub struct SequenceUserAgents {
    agents: Vec<String>,
    cursor: AtomicUsize,
}

impl SequenceUserAgents {
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut agents: Vec<String> = agents.into_iter().map(Into::into).collect();
        if agents.is_empty() {
            agents.push(DEFAULT_USER_AGENT.to_string());
        }
        Self {
            agents,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl UserAgentProvider for SequenceUserAgents {
    fn next_agent(&self) -> String {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.agents.len();
        self.agents[index].clone()
    }
}
