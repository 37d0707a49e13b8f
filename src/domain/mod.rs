// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：记录、记录集和各数据源的实体
/// - 服务（services）：抓取编排与数据分析
///
/// 领域层不直接依赖持久化实现。
pub mod models;
pub mod services;
