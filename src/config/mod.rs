// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理抓取参数、数据源URL模板与选择器覆盖等配置
pub mod settings;
