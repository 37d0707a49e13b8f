// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 日志输出格式的环境变量
pub const LOG_FORMAT_ENV: &str = "HARVESTRS_LOG_FORMAT";

/// 初始化日志
///
/// 默认级别 `info,harvestrs=debug`，可通过 `RUST_LOG` 覆盖。
/// `HARVESTRS_LOG_FORMAT=json` 时输出 JSON 行，否则为文本格式。
/// 重复调用时保留已安装的订阅者。
pub fn init_telemetry() {
    let json = json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harvestrs=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .try_init();
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}
