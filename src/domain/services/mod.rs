// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 分析服务（analyzer）：记录集的描述性统计与词频统计
/// - 抓取服务（scrape_service）：按查询词和页码驱动抓取、提取与汇总
pub mod analyzer;
pub mod scrape_service;
