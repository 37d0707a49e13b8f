// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 负责与文件系统和数据库交互：
/// - 存储（storage）：记录集的 CSV、JSON、Excel 与 SQLite 持久化
pub mod storage;
