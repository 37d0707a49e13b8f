// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 记录、记录集以及各数据源的类型化实体
pub mod listing;
pub mod record;
