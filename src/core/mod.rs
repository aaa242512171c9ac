//! 核心模块
//!
//! 包含引擎的基础设施：
//! - `error` - 错误类型定义
//! - `logging` - tracing 日志初始化
//! - `time` - 命名时间通道
//! - `utils` - 欧拉角 / 仿射矩阵工具

#[macro_use]
pub mod macros;
pub mod error;
pub mod logging;
pub mod time;
pub mod utils;

// 重新导出错误类型
pub use error::{
    AnimationError, AnimationResult, EngineError, EngineResult, ParticleError, ParticleResult,
};

pub use logging::init_logging;
pub use time::{TimeChannels, DEFAULT_TIME_CHANNEL};
