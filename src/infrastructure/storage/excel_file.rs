// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{FieldValue, Record, RecordSet};
use crate::utils::errors::PersistenceError;
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;

const MAX_SHEET_NAME: usize = 31;

/// 记录条数的工作簿名称；末尾全空的行不在已用区域内，读回时据此补齐
const RECORD_COUNT_NAME: &str = "harvestrs_records";

/// 单个工作表：加粗表头为字段并集，数字写为数值单元格，缺失字段留空
pub(super) fn render(records: &RecordSet, base_name: &str) -> Result<Vec<u8>, PersistenceError> {
    let mut workbook = Workbook::new();
    workbook.define_name(RECORD_COUNT_NAME, &format!("={}", records.len()))?;
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(base_name))?;

    let bold = Format::new().set_bold();
    let header = records.field_names();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, column(col)?, name, &bold)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = u32::try_from(index + 1)
            .map_err(|_| PersistenceError::Excel("too many rows for a worksheet".to_string()))?;
        for (col, name) in header.iter().enumerate() {
            let col = column(col)?;
            match record.value(name) {
                FieldValue::Null => {}
                FieldValue::Integer(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                FieldValue::Float(f) => {
                    worksheet.write_number(row, col, *f)?;
                }
                FieldValue::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// 读取第一个工作表，第一行为表头
pub(super) fn parse(bytes: Vec<u8>) -> Result<RecordSet, PersistenceError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let expected = record_count(workbook.defined_names());
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(RecordSet::new()),
    };

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|cell| cell.to_string()).collect(),
        None => Vec::new(),
    };

    let mut records: Vec<Record> = rows
        .map(|row| {
            header
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.as_str(), cell_value(cell)))
                .collect::<Record>()
        })
        .collect();
    if let Some(expected) = expected {
        while records.len() < expected {
            records.push(Record::new());
        }
    }
    Ok(RecordSet::from(records))
}

fn record_count(names: &[(String, String)]) -> Option<usize> {
    names
        .iter()
        .find(|(name, _)| name == RECORD_COUNT_NAME)
        .and_then(|(_, formula)| formula.trim().trim_start_matches('=').parse().ok())
}

fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty | Data::Error(_) => FieldValue::Null,
        Data::Int(i) => FieldValue::Integer(*i),
        Data::Float(f) => FieldValue::from(*f),
        Data::String(s) => FieldValue::text(s.as_str()),
        other => FieldValue::text(other.to_string()),
    }
}

fn column(index: usize) -> Result<u16, PersistenceError> {
    u16::try_from(index)
        .map_err(|_| PersistenceError::Excel("too many columns for a worksheet".to_string()))
}

/// 工作表名不能含 `[]:*?/\`，且最长 31 个字符
fn sheet_name(base_name: &str) -> String {
    let name: String = base_name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '\''))
        .take(MAX_SHEET_NAME)
        .collect();
    if name.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        name
    }
}
