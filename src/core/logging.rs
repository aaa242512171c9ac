//! 日志初始化
//!
//! 基于 tracing-subscriber 的 fmt + EnvFilter。
//! `RUST_LOG` 环境变量优先于配置中的日志级别。

use crate::config::{LogLevel, LoggingConfig};
use tracing_subscriber::EnvFilter;

impl LogLevel {
    /// 转换为 EnvFilter 指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 根据配置构建过滤器
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
}

/// 初始化日志系统
///
/// 重复调用是安全的：已经安装全局 subscriber 时直接返回 `false`。
pub fn init_logging(config: &LoggingConfig) -> bool {
    if !config.log_to_console {
        return false;
    }

    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(target: "engine", level = config.level.as_directive(), "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
        assert_eq!(LogLevel::Trace.as_directive(), "trace");
    }

    #[test]
    fn test_console_disabled() {
        let config = LoggingConfig {
            log_to_console: false,
            ..Default::default()
        };
        assert!(!init_logging(&config));
    }
}
