//! 日志初始化
//!
//! 库内部只通过 `tracing` 宏输出；应用启动时调用一次 [`init_logging`]
//! 安装 fmt 订阅器，并把 `log` 记录桥接到 `tracing`。

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时的默认过滤规则
pub const DEFAULT_LOG_FILTER: &str = "painter=info";

/// 使用默认规则初始化日志（`RUST_LOG` 优先）
///
/// 重复调用无副作用，返回是否由本次调用完成安装。
pub fn init_logging() -> bool {
    init_logging_with_filter(DEFAULT_LOG_FILTER)
}

/// 使用指定的默认规则初始化日志（`RUST_LOG` 优先）
pub fn init_logging_with_filter(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    // 已有 log 实现时保持原状
    let _ = tracing_log::LogTracer::init();
    true
}
