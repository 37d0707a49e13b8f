// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 数据分析模块
//!
//! 对记录集做只读的描述性统计和词频统计，空记录集返回零计数

use crate::domain::models::record::{FieldValue, RecordSet};
use crate::utils::text_processing::{tokenize, top_words};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// 默认葡萄牙语停用词
pub const PORTUGUESE_STOP_WORDS: &[&str] = &[
    "de", "da", "do", "com", "para", "em", "e", "o", "a", "os", "as", "um", "uma",
];

/// 字段值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// 没有非空值
    Empty,
    Text,
    Integer,
    /// 浮点数，或整数与浮点数混合
    Float,
    /// 文本与数字混合
    Mixed,
}

impl ValueType {
    fn of(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => ValueType::Empty,
            FieldValue::Integer(_) => ValueType::Integer,
            FieldValue::Float(_) => ValueType::Float,
            FieldValue::Text(_) => ValueType::Text,
        }
    }

    fn merge(self, other: ValueType) -> Self {
        use ValueType::*;
        match (self, other) {
            (Empty, t) | (t, Empty) => t,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Mixed,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Empty => "empty",
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// 单个字段的统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub name: String,
    pub value_type: ValueType,
    pub non_null: usize,
    pub null_count: usize,
    /// 空值占比，记录集为空时为 0
    pub null_ratio: f64,
    /// 不同的非空值个数
    pub unique_values: usize,
}

/// 基本统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub total_records: usize,
    pub fields: Vec<FieldStats>,
}

impl BasicStats {
    pub fn field(&self, name: &str) -> Option<&FieldStats> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// 词频项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// 文本字段分析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub field: String,
    /// 非空值个数
    pub total_entries: usize,
    /// 平均字符数
    pub average_length: f64,
    pub max_length: usize,
    pub min_length: usize,
    pub top_words: Vec<WordCount>,
}

/// 文本分析选项
#[derive(Debug, Clone)]
pub struct TextAnalysisOptions {
    pub top_n: usize,
    /// 短于该长度（字符数）的词被忽略
    pub min_token_len: usize,
    pub stop_words: HashSet<String>,
}

impl Default for TextAnalysisOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_token_len: 3,
            stop_words: PORTUGUESE_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// 数据分析器
pub struct DataAnalyzer<'a> {
    records: &'a RecordSet,
}

impl<'a> DataAnalyzer<'a> {
    pub fn new(records: &'a RecordSet) -> Self {
        Self { records }
    }

    /// 基本统计：记录数以及每个字段的类型、空值和唯一值
    pub fn basic_stats(&self) -> BasicStats {
        let total = self.records.len();
        let fields = self
            .records
            .field_names()
            .into_iter()
            .map(|name| self.field_stats(name, total))
            .collect();

        BasicStats {
            total_records: total,
            fields,
        }
    }

    fn field_stats(&self, name: String, total: usize) -> FieldStats {
        let mut value_type = ValueType::Empty;
        let mut non_null = 0;
        let mut seen: HashSet<UniqueKey> = HashSet::new();

        for value in self.records.iter().map(|r| r.value(&name)) {
            if value.is_null() {
                continue;
            }
            non_null += 1;
            value_type = value_type.merge(ValueType::of(value));
            seen.insert(UniqueKey::from(value));
        }

        let null_count = total - non_null;
        FieldStats {
            name,
            value_type,
            non_null,
            null_count,
            null_ratio: if total == 0 {
                0.0
            } else {
                null_count as f64 / total as f64
            },
            unique_values: seen.len(),
        }
    }

    /// 使用默认选项分析文本字段
    pub fn analyze_text_field(&self, field: &str) -> TextAnalysis {
        self.analyze_text_field_with(field, &TextAnalysisOptions::default())
    }

    /// 分析文本字段的长度分布与高频词
    ///
    /// 非空值按其文本形式参与统计；字段不存在时返回零计数
    pub fn analyze_text_field_with(&self, field: &str, options: &TextAnalysisOptions) -> TextAnalysis {
        let entries: Vec<String> = self
            .records
            .iter()
            .map(|r| r.value(field))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();

        let lengths: Vec<usize> = entries.iter().map(|e| e.chars().count()).collect();
        let average_length = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
        };

        let tokens = entries.iter().flat_map(|entry| tokenize(entry)).filter(|token| {
            token.chars().count() >= options.min_token_len && !options.stop_words.contains(token)
        });
        let top_words = top_words(tokens, options.top_n)
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect();

        TextAnalysis {
            field: field.to_string(),
            total_entries: entries.len(),
            average_length,
            max_length: lengths.iter().copied().max().unwrap_or(0),
            min_length: lengths.iter().copied().min().unwrap_or(0),
            top_words,
        }
    }
}

/// 唯一值比较键，整数与浮点数按数值比较
#[derive(Hash, PartialEq, Eq)]
enum UniqueKey {
    Number(u64),
    Text(String),
}

impl From<&FieldValue> for UniqueKey {
    fn from(value: &FieldValue) -> Self {
        match value.as_f64() {
            // +0.0 and -0.0 share a key
            Some(number) => UniqueKey::Number((number + 0.0).to_bits()),
            None => UniqueKey::Text(value.to_string()),
        }
    }
}
