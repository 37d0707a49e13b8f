// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{FieldValue, Record, RecordSet};
use crate::utils::errors::PersistenceError;

/// 表头为字段并集，缺失字段与 `Null` 写为空单元格；空记录集生成空文件
pub(super) fn render(records: &RecordSet) -> Result<Vec<u8>, PersistenceError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let header = records.field_names();
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|name| record.value(name).to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| PersistenceError::Io(e.into_error()))
}

pub(super) fn parse(bytes: &[u8]) -> Result<RecordSet, PersistenceError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let header = reader.headers()?.clone();

    let mut records = RecordSet::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = header
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name, FieldValue::infer(cell)))
            .collect();
        records.push(record);
    }
    Ok(records)
}
