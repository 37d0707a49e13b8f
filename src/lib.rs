// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心实体、抓取编排和数据分析
pub mod domain;

/// 引擎模块
///
/// HTTP 抓取引擎、速率限制、User-Agent 轮换和重试
pub mod engines;

/// 提取器模块
///
/// 将 HTML 文档映射为职位、商品和新闻记录
pub mod extractors;

/// 基础设施模块
///
/// 记录集的多格式持久化
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
