// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{FieldValue, Record, RecordSet};
use crate::utils::errors::PersistenceError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use std::path::Path;

/// 以记录集替换同名表
///
/// 删表、建表和全部插入在同一个事务中完成
pub(super) async fn write(path: &Path, table: &str, records: &RecordSet) -> Result<(), PersistenceError> {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await?;

    let mut tx = conn.begin().await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote(table)))
        .execute(&mut *tx)
        .await?;

    if !records.is_empty() {
        let columns = records.field_names();
        let definitions: Vec<String> = columns
            .iter()
            .map(|name| match column_type(records, name) {
                Some(affinity) => format!("{} {}", quote(name), affinity),
                None => quote(name),
            })
            .collect();
        sqlx::query(&format!(
            "CREATE TABLE {} ({})",
            quote(table),
            definitions.join(", ")
        ))
        .execute(&mut *tx)
        .await?;

        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table),
            columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        for record in records {
            let mut query = sqlx::query(&insert);
            for name in &columns {
                query = match record.value(name) {
                    FieldValue::Null => query.bind(None::<String>),
                    FieldValue::Integer(i) => query.bind(*i),
                    FieldValue::Float(f) => query.bind(*f),
                    FieldValue::Text(s) => query.bind(s.as_str()),
                };
            }
            query.execute(&mut *tx).await?;
        }
    }

    tx.commit().await?;
    conn.close().await?;
    Ok(())
}

/// 按插入顺序读取表，表不存在时返回空记录集
pub(super) async fn read(path: &Path, table: &str) -> Result<RecordSet, PersistenceError> {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .connect()
        .await?;

    let exists: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&mut conn)
            .await?;

    let records = match exists {
        Some(_) => {
            let rows = sqlx::query(&format!("SELECT * FROM {} ORDER BY rowid", quote(table)))
                .fetch_all(&mut conn)
                .await?;
            rows.iter()
                .map(row_to_record)
                .collect::<Result<RecordSet, sqlx::Error>>()?
        }
        None => RecordSet::new(),
    };

    conn.close().await?;
    Ok(records)
}

fn row_to_record(row: &SqliteRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            FieldValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => FieldValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => FieldValue::Float(row.try_get_unchecked::<f64, _>(index)?),
                _ => FieldValue::text(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        record = record.with(column.name(), value);
    }
    Ok(record)
}

/// 列中所有非空值一致时的类型；整数与浮点数混合为 REAL，其余混合不声明类型
fn column_type(records: &RecordSet, name: &str) -> Option<&'static str> {
    let mut affinity: Option<&'static str> = None;
    for value in records.iter().map(|r| r.value(name)) {
        let current = match value {
            FieldValue::Null => continue,
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Float(_) => "REAL",
            FieldValue::Text(_) => "TEXT",
        };
        affinity = match (affinity, current) {
            (None, t) => Some(t),
            (Some(a), t) if a == t => Some(a),
            (Some("INTEGER"), "REAL") | (Some("REAL"), "INTEGER") => Some("REAL"),
            _ => return None,
        };
    }
    affinity
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_types() {
        let records = RecordSet::from(vec![
            Record::new()
                .with("name", "Notebook")
                .with("price", 10_i64)
                .with("reviews", 3_i64)
                .with("note", "x"),
            Record::new()
                .with("name", FieldValue::Null)
                .with("price", 9.5)
                .with("reviews", 4_i64)
                .with("note", 1_i64),
        ]);

        assert_eq!(column_type(&records, "name"), Some("TEXT"));
        assert_eq!(column_type(&records, "price"), Some("REAL"));
        assert_eq!(column_type(&records, "reviews"), Some("INTEGER"));
        assert_eq!(column_type(&records, "note"), None);
        assert_eq!(column_type(&records, "missing"), None);
    }

    #[test]
    fn test_quote_escapes_identifiers() {
        assert_eq!(quote("vagas"), "\"vagas\"");
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn test_replaces_existing_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noticias.db");
        let first = RecordSet::from(vec![Record::new().with("title", "Antiga").with("views", 1_i64)]);
        let second = RecordSet::from(vec![
            Record::new().with("title", "Nova").with("topic", "IA"),
            Record::new().with("title", "Outra").with("score", 2.5),
        ]);

        write(&path, "noticias", &first).await.unwrap();
        write(&path, "noticias", &second).await.unwrap();

        let loaded = read(&path, "noticias").await.unwrap();
        assert_eq!(loaded, second);
        let names: Vec<_> = loaded.records()[0].field_names().collect();
        assert_eq!(names, vec!["title", "topic", "score"]);
    }

    #[tokio::test]
    async fn test_empty_set_leaves_no_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vazio.db");

        write(&path, "vazio", &RecordSet::new()).await.unwrap();

        assert!(path.exists());
        assert!(read(&path, "vazio").await.unwrap().is_empty());
    }
}
