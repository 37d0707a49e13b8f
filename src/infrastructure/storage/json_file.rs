// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::RecordSet;
use crate::utils::errors::PersistenceError;

/// 缩进格式的对象数组，字段保持记录中的顺序
pub(super) fn render(records: &RecordSet) -> Result<Vec<u8>, PersistenceError> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub(super) fn parse(bytes: &[u8]) -> Result<RecordSet, PersistenceError> {
    Ok(serde_json::from_slice(bytes)?)
}
