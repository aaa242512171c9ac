//! 通用参数轨道
//!
//! `ParameterTrack` 持有一条类型在创建时即确定的曲线，
//! 值类型为闭合集合 `{ i32, f32, Vec2, Vec3, Vec4, Quat }`。
//! 类型不一致的关键帧会被显式拒绝。

use glam::{Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::easing::EasingId;
use super::keyframe::{Curve, Interpolate};
use crate::core::{AnimationError, AnimationResult};

/// 参数值类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Quat,
}

impl ValueKind {
    /// 该类型的零值（四元数为单位四元数）
    pub fn zero(self) -> ParameterValue {
        match self {
            ValueKind::Int => ParameterValue::Int(0),
            ValueKind::Float => ParameterValue::Float(0.0),
            ValueKind::Vec2 => ParameterValue::Vec2(Vec2::ZERO),
            ValueKind::Vec3 => ParameterValue::Vec3(Vec3::ZERO),
            ValueKind::Vec4 => ParameterValue::Vec4(Vec4::ZERO),
            ValueKind::Quat => ParameterValue::Quat(Quat::IDENTITY),
        }
    }
}

/// 参数值（带标签联合）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParameterValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Quat(Quat),
}

impl ParameterValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ParameterValue::Int(_) => ValueKind::Int,
            ParameterValue::Float(_) => ValueKind::Float,
            ParameterValue::Vec2(_) => ValueKind::Vec2,
            ParameterValue::Vec3(_) => ValueKind::Vec3,
            ParameterValue::Vec4(_) => ValueKind::Vec4,
            ParameterValue::Quat(_) => ValueKind::Quat,
        }
    }

    /// 取出具体类型的值
    pub fn get<T: ParameterType>(self) -> AnimationResult<T> {
        T::from_value(self)
    }
}

/// 可作为参数轨道值的类型
pub trait ParameterType: Interpolate + Sized {
    const KIND: ValueKind;

    fn into_value(self) -> ParameterValue;
    fn from_value(value: ParameterValue) -> AnimationResult<Self>;
    fn curve(track: &ParameterTrack) -> Option<&Curve<Self>>;
    fn curve_mut(track: &mut ParameterTrack) -> Option<&mut Curve<Self>>;
}

macro_rules! impl_parameter_type {
    ($ty:ty, $variant:ident) => {
        impl ParameterType for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn into_value(self) -> ParameterValue {
                ParameterValue::$variant(self)
            }

            fn from_value(value: ParameterValue) -> AnimationResult<Self> {
                match value {
                    ParameterValue::$variant(v) => Ok(v),
                    other => Err(AnimationError::TypeMismatch {
                        expected: Self::KIND,
                        found: other.kind(),
                    }),
                }
            }

            fn curve(track: &ParameterTrack) -> Option<&Curve<Self>> {
                match track {
                    ParameterTrack::$variant(curve) => Some(curve),
                    _ => None,
                }
            }

            fn curve_mut(track: &mut ParameterTrack) -> Option<&mut Curve<Self>> {
                match track {
                    ParameterTrack::$variant(curve) => Some(curve),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ParameterValue {
            fn from(v: $ty) -> Self {
                ParameterValue::$variant(v)
            }
        }
    };
}

impl_parameter_type!(i32, Int);
impl_parameter_type!(f32, Float);
impl_parameter_type!(Vec2, Vec2);
impl_parameter_type!(Vec3, Vec3);
impl_parameter_type!(Vec4, Vec4);
impl_parameter_type!(Quat, Quat);

/// 参数轨道
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "keyframes")]
pub enum ParameterTrack {
    Int(Curve<i32>),
    Float(Curve<f32>),
    Vec2(Curve<Vec2>),
    Vec3(Curve<Vec3>),
    Vec4(Curve<Vec4>),
    Quat(Curve<Quat>),
}

/// 对每种曲线执行同一表达式
macro_rules! for_each_curve {
    ($track:expr, $curve:ident => $body:expr) => {
        match $track {
            ParameterTrack::Int($curve) => $body,
            ParameterTrack::Float($curve) => $body,
            ParameterTrack::Vec2($curve) => $body,
            ParameterTrack::Vec3($curve) => $body,
            ParameterTrack::Vec4($curve) => $body,
            ParameterTrack::Quat($curve) => $body,
        }
    };
}

impl ParameterTrack {
    /// 创建指定类型的空轨道
    pub fn new(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int => ParameterTrack::Int(Curve::new()),
            ValueKind::Float => ParameterTrack::Float(Curve::new()),
            ValueKind::Vec2 => ParameterTrack::Vec2(Curve::new()),
            ValueKind::Vec3 => ParameterTrack::Vec3(Curve::new()),
            ValueKind::Vec4 => ParameterTrack::Vec4(Curve::new()),
            ValueKind::Quat => ParameterTrack::Quat(Curve::new()),
        }
    }

    /// 以样本值确定类型，创建空轨道
    pub fn for_value(sample: ParameterValue) -> Self {
        Self::new(sample.kind())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ParameterTrack::Int(_) => ValueKind::Int,
            ParameterTrack::Float(_) => ValueKind::Float,
            ParameterTrack::Vec2(_) => ValueKind::Vec2,
            ParameterTrack::Vec3(_) => ValueKind::Vec3,
            ParameterTrack::Vec4(_) => ValueKind::Vec4,
            ParameterTrack::Quat(_) => ValueKind::Quat,
        }
    }

    /// 添加关键帧，类型不一致时返回 `TypeMismatch`
    pub fn add_keyframe(
        &mut self,
        time: f32,
        value: ParameterValue,
        easing: EasingId,
    ) -> AnimationResult<usize> {
        match (self, value) {
            (ParameterTrack::Int(c), ParameterValue::Int(v)) => Ok(c.insert(time, v, easing)),
            (ParameterTrack::Float(c), ParameterValue::Float(v)) => Ok(c.insert(time, v, easing)),
            (ParameterTrack::Vec2(c), ParameterValue::Vec2(v)) => Ok(c.insert(time, v, easing)),
            (ParameterTrack::Vec3(c), ParameterValue::Vec3(v)) => Ok(c.insert(time, v, easing)),
            (ParameterTrack::Vec4(c), ParameterValue::Vec4(v)) => Ok(c.insert(time, v, easing)),
            (ParameterTrack::Quat(c), ParameterValue::Quat(v)) => Ok(c.insert(time, v, easing)),
            (track, value) => Err(AnimationError::TypeMismatch {
                expected: track.kind(),
                found: value.kind(),
            }),
        }
    }

    /// 在指定时间插入该类型的零值关键帧（线性缓动），返回插入位置
    ///
    /// 各类型的 `Default` 即 `ValueKind::zero`（四元数为单位四元数）。
    pub fn add_default_keyframe(&mut self, time: f32) -> usize {
        for_each_curve!(self, c => c.insert(time, Default::default(), EasingId::Linear))
    }

    /// 求值
    pub fn evaluate(&self, time: f32) -> ParameterValue {
        match self {
            ParameterTrack::Int(c) => ParameterValue::Int(c.evaluate(time)),
            ParameterTrack::Float(c) => ParameterValue::Float(c.evaluate(time)),
            ParameterTrack::Vec2(c) => ParameterValue::Vec2(c.evaluate(time)),
            ParameterTrack::Vec3(c) => ParameterValue::Vec3(c.evaluate(time)),
            ParameterTrack::Vec4(c) => ParameterValue::Vec4(c.evaluate(time)),
            ParameterTrack::Quat(c) => ParameterValue::Quat(c.evaluate(time)),
        }
    }

    /// 求值并取出具体类型
    pub fn evaluate_as<T: ParameterType>(&self, time: f32) -> AnimationResult<T> {
        match T::curve(self) {
            Some(curve) => Ok(curve.evaluate(time)),
            None => Err(AnimationError::TypeMismatch {
                expected: self.kind(),
                found: T::KIND,
            }),
        }
    }

    /// 具体类型的曲线
    pub fn curve<T: ParameterType>(&self) -> Option<&Curve<T>> {
        T::curve(self)
    }

    pub fn curve_mut<T: ParameterType>(&mut self) -> Option<&mut Curve<T>> {
        T::curve_mut(self)
    }

    /// 读取关键帧的值
    pub fn keyframe_value(&self, index: usize) -> Option<ParameterValue> {
        for_each_curve!(self, c => c.get(index).map(|k| k.value.into_value()))
    }

    pub fn keyframe_time(&self, index: usize) -> Option<f32> {
        for_each_curve!(self, c => c.get(index).map(|k| k.time))
    }

    pub fn len(&self) -> usize {
        for_each_curve!(self, c => c.len())
    }

    pub fn is_empty(&self) -> bool {
        for_each_curve!(self, c => c.is_empty())
    }

    pub fn duration(&self) -> f32 {
        for_each_curve!(self, c => c.duration())
    }

    /// 修改关键帧时间，返回新位置
    pub fn set_keyframe_time(&mut self, index: usize, time: f32) -> Option<usize> {
        for_each_curve!(self, c => c.set_time(index, time))
    }

    pub fn remove_keyframe(&mut self, index: usize) -> bool {
        for_each_curve!(self, c => c.remove(index).is_some())
    }

    pub fn mark_keyframe(&mut self, index: usize, marked: bool) {
        for_each_curve!(self, c => c.mark(index, marked))
    }

    /// 删除所有带删除标记的关键帧
    pub fn delete_marked(&mut self) -> usize {
        for_each_curve!(self, c => c.delete_marked())
    }

    pub fn clear(&mut self) {
        for_each_curve!(self, c => c.clear())
    }
}
