//! 日志初始化
//!
//! 库内部统一使用 `tracing` 宏；`log` 记录通过 `tracing-log` 桥接到同一个订阅者。

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 默认日志级别（`RUST_LOG` 未设置时）
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 初始化日志
///
/// - 过滤规则取自 `RUST_LOG`，未设置时为 `info`
/// - 重复调用无副作用；已有全局订阅者时保留原订阅者
pub fn init_logger() {
    init_logger_with(DEFAULT_LOG_FILTER);
}

/// 用指定的默认过滤规则初始化日志（`RUST_LOG` 优先）
pub fn init_logger_with(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .finish();

        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            // 已有 log 后端时忽略
            let _ = tracing_log::LogTracer::builder()
                .with_max_level(log::LevelFilter::Trace)
                .init();
        }
    });
}
