//! 统一错误处理模块
//!
//! ## 错误类型分层
//!
//! - **动画错误** (`AnimationError`): 参数轨道类型不匹配、未知标签等
//! - **粒子错误** (`ParticleError`): 模型/管线/修改器解析失败、相机缺失等
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析与验证
//!
//! `EngineError` 聚合以上所有错误，供组合根统一处理。

use crate::animation::ValueKind;
use crate::config::ConfigError;
use thiserror::Error;

/// 引擎顶层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),

    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 动画系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// 关键帧值类型与轨道类型不一致
    #[error("Invalid type: track holds {expected:?}, keyframe is {found:?}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    #[error("Unknown animation label: {0}")]
    UnknownLabel(String),

    #[error("Animation label already exists: {0}")]
    DuplicateLabel(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// 粒子系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticleError {
    #[error("Model not found: {0}")]
    MissingModel(String),

    #[error("Pipeline unavailable for flags {0:#x}")]
    PipelineUnavailable(u64),

    #[error("Modifier factory not configured")]
    ModifierFactoryNotConfigured,

    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("Camera is not set")]
    CameraNotSet,

    #[error("Particle group not found: {0}")]
    GroupNotFound(String),

    #[error("Invalid emitter settings: {0}")]
    InvalidEmitter(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type AnimationResult<T> = Result<T, AnimationError>;
pub type ParticleResult<T> = Result<T, ParticleError>;
