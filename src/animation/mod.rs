//! 动画系统模块
//!
//! 提供缓动函数、关键帧曲线、运行时类型化参数轨道与动画序列。
//!
//! ## 功能特性
//!
//! - 33 种缓动函数，可按整数索引选择
//! - 始终有序的关键帧曲线，逐关键帧缓动
//! - `i32`/`f32`/`Vec2`/`Vec3`/`Vec4`/`Quat` 参数轨道
//! - 共享时钟的命名轨道序列
//!
//! ## 使用示例
//!
//! ```rust
//! use particle_engine::animation::{Curve, EasingId, ParameterTrack, ParameterValue, ValueKind};
//! use glam::Vec3;
//!
//! let mut curve = Curve::new();
//! curve.insert(0.0, Vec3::ZERO, EasingId::Linear);
//! curve.insert(1.0, Vec3::new(10.0, 0.0, 0.0), EasingId::Linear);
//! assert_eq!(curve.evaluate(0.5), Vec3::new(5.0, 0.0, 0.0));
//!
//! let mut track = ParameterTrack::new(ValueKind::Float);
//! assert!(track
//!     .add_keyframe(0.0, ParameterValue::Vec3(Vec3::ONE), EasingId::Linear)
//!     .is_err());
//! ```

pub mod easing;
pub mod keyframe;
pub mod sequence;
pub mod track;

pub use easing::EasingId;
pub use keyframe::{Curve, Interpolate, Keyframe};
pub use sequence::{AnimationSequence, SequenceTrack};
pub use track::{ParameterTrack, ParameterType, ParameterValue, ValueKind};
