// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 配置错误类型
///
/// 在任何网络请求之前检测到，直接返回给调用方
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("无效配置: {0}")]
    Invalid(String),

    #[error("查询词列表为空或包含空白查询词")]
    EmptyQuery,

    #[error("字段 {field} 的选择器无效: {reason}")]
    InvalidSelector { field: String, reason: String },

    #[error("URL模板 {template} 无效: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("配置加载失败: {0}")]
    Load(#[from] config::ConfigError),

    #[error("HTTP客户端初始化失败: {0}")]
    HttpClient(String),
}

impl From<validator::ValidationErrors> for ConfigurationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ConfigurationError::Invalid(errors.to_string())
    }
}

/// 单次请求失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// 非 2xx 状态码
    Status(u16),
    /// 网络层错误（连接、超时、TLS 等）
    Network(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status(code) => write!(f, "HTTP status {}", code),
            AttemptFailure::Network(message) => write!(f, "network error: {}", message),
        }
    }
}

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("无效URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("请求 {url} 在 {attempts} 次尝试后失败，最后一次: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: AttemptFailure,
    },
}

impl FetchError {
    /// 已发起的请求次数
    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::InvalidUrl { .. } => 0,
            FetchError::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// 提取错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("页面 {url} 中没有可提取的字段")]
    NoFields { url: String },
}

/// 持久化错误类型
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("不支持的输出格式: {0}")]
    UnsupportedFormat(String),

    #[error("无效的文件基础名: {0:?}")]
    InvalidName(String),

    #[error("输出路径不可写 {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV错误: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel错误: {0}")]
    Excel(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<rust_xlsxwriter::XlsxError> for PersistenceError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        PersistenceError::Excel(error.to_string())
    }
}

impl From<calamine::XlsxError> for PersistenceError {
    fn from(error: calamine::XlsxError) -> Self {
        PersistenceError::Excel(error.to_string())
    }
}

impl From<tempfile::PersistError> for PersistenceError {
    fn from(error: tempfile::PersistError) -> Self {
        PersistenceError::Io(error.error)
    }
}
