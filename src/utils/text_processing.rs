// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本处理模块
//!
//! 提供抓取结果的文本规范化、分词和数值解析：
//! - 空白折叠
//! - 小写分词并去除标点
//! - 兼容 `1.299,90` 与 `1,299.90` 两种写法的数值解析

use std::collections::HashMap;

/// 折叠连续空白并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 小写分词
///
/// 以非单词字符（字母、数字、下划线之外）切分，标点随之去除
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// 统计词频并返回前 `top_n` 个
///
/// 按出现次数降序排列，次数相同时按首次出现的顺序
pub fn top_words<I>(tokens: I, top_n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    // word -> (count, first occurrence)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.into_iter().enumerate() {
        counts.entry(token).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, (count, _))| (word, count))
        .collect()
}

/// 解析小数
///
/// 只保留数字与分隔符；两种分隔符同时出现时以最后出现的为小数点，
/// 只出现逗号且其后恰好有一或两位数字时视为小数点，
/// 只出现多个点时视为千位分隔符
pub fn parse_decimal(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let negative = text[..start].trim_end().ends_with('-');
    let raw: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let raw = raw.trim_end_matches(['.', ',']);

    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => raw.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (None, Some(comma)) => {
            let decimals = raw.len() - comma - 1;
            if raw.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                raw.replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (Some(dot), None) => {
            let decimals = raw.len() - dot - 1;
            let thousands = decimals == 3 && dot <= 3 && !raw.starts_with('0');
            if raw.matches('.').count() > 1 || thousands {
                raw.replace('.', "")
            } else {
                raw.to_string()
            }
        }
        (None, None) => raw.to_string(),
    };

    let value: f64 = normalized.parse().ok()?;
    let value = if negative { -value } else { value };
    value.is_finite().then_some(value)
}

/// 解析整数，忽略千位分隔符与其他非数字字符
pub fn parse_integer(text: &str) -> Option<i64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
