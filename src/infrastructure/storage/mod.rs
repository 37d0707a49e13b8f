// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 记录持久化
//!
//! 将记录集写为 `{output_path}/{base_name}.{csv|json|xlsx|db}`，并能读回。
//! 文本格式先在内存中生成，再写入同目录的临时文件后重命名，
//! 因此目标文件要么是旧内容，要么是完整的新内容。

mod csv_file;
mod excel_file;
mod json_file;
mod sqlite_file;

use crate::config::settings::{OutputFormat, ScrapingConfig};
use crate::domain::models::listing::SourceKind;
use crate::domain::models::record::RecordSet;
use crate::utils::errors::PersistenceError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// 记录存储
#[derive(Debug, Clone)]
pub struct RecordStorage {
    output_dir: PathBuf,
}

impl RecordStorage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self::new(&config.output_path)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 目标文件路径
    pub fn path_for(&self, base_name: &str, format: OutputFormat) -> Result<PathBuf, PersistenceError> {
        validate_base_name(base_name)?;
        Ok(self
            .output_dir
            .join(format!("{}.{}", base_name, format.extension())))
    }

    /// 以字符串指定格式保存
    ///
    /// 未知格式返回 `UnsupportedFormat`，不创建任何文件
    pub async fn save_as(
        &self,
        records: &RecordSet,
        base_name: &str,
        format: &str,
    ) -> Result<PathBuf, PersistenceError> {
        let format: OutputFormat = format.parse()?;
        self.save(records, base_name, format).await
    }

    /// 保存记录集
    ///
    /// # 参数
    ///
    /// * `records` - 记录集，只借用不消耗
    /// * `base_name` - 不含扩展名和路径分隔符的文件名
    /// * `format` - 输出格式
    ///
    /// # 返回值
    ///
    /// 写入的文件路径
    pub async fn save(
        &self,
        records: &RecordSet,
        base_name: &str,
        format: OutputFormat,
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(base_name, format)?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| PersistenceError::Unwritable {
                path: self.output_dir.clone(),
                source,
            })?;

        if records.is_empty() {
            warn!(path = %path.display(), format = %format, "Saving an empty record set");
        }

        match format {
            OutputFormat::Csv => write_atomic(&path, csv_file::render(records)?).await?,
            OutputFormat::Json => write_atomic(&path, json_file::render(records)?).await?,
            OutputFormat::Excel => {
                write_atomic(&path, excel_file::render(records, base_name)?).await?
            }
            OutputFormat::Sqlite => sqlite_file::write(&path, base_name, records).await?,
        }

        info!(
            path = %path.display(),
            format = %format,
            records = records.len(),
            "Records saved"
        );
        Ok(path)
    }

    /// 读回已保存的文件
    ///
    /// 不知道字段类型时，CSV 单元格只要是整数或浮点数的规范写法就还原为数字，
    /// 形如数字的文本需要用 [`RecordStorage::load_source`] 读回；
    /// SQLite 读取与文件名同名的表，表不存在时返回空记录集
    pub async fn load(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<RecordSet, PersistenceError> {
        let path = path.as_ref();
        let records = match format {
            OutputFormat::Csv => csv_file::parse(&tokio::fs::read(path).await?)?,
            OutputFormat::Json => json_file::parse(&tokio::fs::read(path).await?)?,
            OutputFormat::Excel => excel_file::parse(tokio::fs::read(path).await?)?,
            OutputFormat::Sqlite => {
                let table = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(|| PersistenceError::InvalidName(path.display().to_string()))?;
                sqlite_file::read(path, table).await?
            }
        };
        Ok(records)
    }

    /// 按数据源的字段类型读回
    ///
    /// 文本字段（例如薪资 `8000`）保持为文本，Excel 中的评论数恢复为整数
    pub async fn load_source(
        &self,
        path: impl AsRef<Path>,
        format: OutputFormat,
        kind: SourceKind,
    ) -> Result<RecordSet, PersistenceError> {
        Ok(kind.conform(self.load(path, format).await?))
    }
}

fn validate_base_name(base_name: &str) -> Result<(), PersistenceError> {
    let invalid = base_name.trim().is_empty()
        || base_name == "."
        || base_name == ".."
        || base_name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(PersistenceError::InvalidName(base_name.to_string()));
    }
    Ok(())
}

/// 写入同目录临时文件后重命名到目标路径
async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), PersistenceError> {
    let path = path.to_path_buf();
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    tokio::task::spawn_blocking(move || -> Result<(), PersistenceError> {
        let mut file = NamedTempFile::new_in(&dir)
            .map_err(|source| PersistenceError::Unwritable { path: dir.clone(), source })?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(&path)?;
        Ok(())
    })
    .await
    .map_err(|e| PersistenceError::Io(std::io::Error::other(e)))?
}
