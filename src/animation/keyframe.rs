//! 关键帧曲线
//!
//! `Curve<T>` 是按时间升序排列的关键帧序列。插入总是通过二分查找定位，
//! 相同时间的关键帧插入到已有关键帧之后，因此曲线始终有序。
//!
//! 求值规则：
//! - 空曲线返回类型默认值
//! - 单个关键帧返回其值
//! - 首个关键帧之前 / 最后一个之后钳制到边界值
//! - 区间内使用后一个关键帧的缓动函数对局部 `t` 进行变换后插值

use glam::{Quat, Vec2, Vec3, Vec4};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::easing::EasingId;

/// 可插值类型
pub trait Interpolate: Clone + Default {
    /// 在 `a`、`b` 之间按 `t` 插值（`t` 可能超出 `[0,1]`）
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self;
}

impl Interpolate for i32 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        let v = *a as f32 + (*b as f32 - *a as f32) * t;
        v.round() as i32
    }
}

impl Interpolate for f32 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Interpolate for Vec2 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Vec3 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Vec4 {
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Quat {
    /// 球面线性插值，走最短弧
    fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        a.slerp(*b, t)
    }
}

/// 关键帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// 时间
    pub time: f32,
    /// 值
    pub value: T,
    /// 进入该关键帧时使用的缓动函数
    #[serde(default)]
    pub easing: EasingId,
    /// 编辑器删除标记
    #[serde(skip)]
    pub marked: bool,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T, easing: EasingId) -> Self {
        Self {
            time,
            value,
            easing,
            marked: false,
        }
    }
}

/// 关键帧曲线
#[derive(Debug, Clone, PartialEq)]
pub struct Curve<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for Curve<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T> Curve<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常量曲线（单个关键帧）
    pub fn constant(value: T) -> Self {
        let mut curve = Self::new();
        curve.insert(0.0, value, EasingId::Linear);
        curve
    }

    /// 从任意顺序的关键帧构建，按时间稳定排序
    pub fn from_keyframes(keyframes: impl IntoIterator<Item = Keyframe<T>>) -> Self {
        let mut keyframes: Vec<Keyframe<T>> = keyframes
            .into_iter()
            .map(|mut k| {
                k.time = sanitize_time(k.time);
                k
            })
            .collect();
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keyframes }
    }

    /// 插入关键帧，返回插入位置
    pub fn insert(&mut self, time: f32, value: T, easing: EasingId) -> usize {
        let time = sanitize_time(time);
        let index = self.keyframes.partition_point(|k| k.time <= time);
        self.keyframes
            .insert(index, Keyframe::new(time, value, easing));
        index
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe<T>> {
        self.keyframes.get(index)
    }

    /// 最后一个关键帧的时间（空曲线为 0）
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// 修改关键帧的值与缓动
    pub fn set_value(&mut self, index: usize, value: T, easing: EasingId) -> bool {
        match self.keyframes.get_mut(index) {
            Some(k) => {
                k.value = value;
                k.easing = easing;
                true
            }
            None => false,
        }
    }

    /// 修改关键帧时间，重新定位以保持有序，返回新位置
    pub fn set_time(&mut self, index: usize, time: f32) -> Option<usize> {
        if index >= self.keyframes.len() {
            return None;
        }
        let mut keyframe = self.keyframes.remove(index);
        keyframe.time = sanitize_time(time);
        let new_index = self.keyframes.partition_point(|k| k.time <= keyframe.time);
        self.keyframes.insert(new_index, keyframe);
        Some(new_index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Keyframe<T>> {
        if index < self.keyframes.len() {
            Some(self.keyframes.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// 设置删除标记
    pub fn mark(&mut self, index: usize, marked: bool) {
        if let Some(k) = self.keyframes.get_mut(index) {
            k.marked = marked;
        }
    }

    /// 删除所有带标记的关键帧，返回删除数量
    pub fn delete_marked(&mut self) -> usize {
        self.delete_where(|k| k.marked)
    }

    /// 删除满足条件的关键帧，返回删除数量
    pub fn delete_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Keyframe<T>) -> bool,
    {
        let before = self.keyframes.len();
        self.keyframes.retain(|k| !predicate(k));
        before - self.keyframes.len()
    }
}

impl<T: Interpolate> Curve<T> {
    /// 在指定时间求值
    pub fn evaluate(&self, time: f32) -> T {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return T::default(),
        };

        // NaN 也落入首个关键帧
        if !(time > first.time) {
            return first.value.clone();
        }
        if time >= last.time {
            return last.value.clone();
        }

        let next_index = self.keyframes.partition_point(|k| k.time <= time);
        let prev = &self.keyframes[next_index - 1];
        let next = &self.keyframes[next_index];

        let local_t = (time - prev.time) / (next.time - prev.time);
        let eased = next.easing.evaluate(local_t);
        T::interpolate(&prev.value, &next.value, eased)
    }
}

impl<T: Serialize> Serialize for Curve<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keyframes.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Curve<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keyframes = Vec::<Keyframe<T>>::deserialize(deserializer)?;
        Ok(Curve::from_keyframes(keyframes))
    }
}

fn sanitize_time(time: f32) -> f32 {
    if time.is_nan() {
        tracing::warn!(target: "animation", "NaN keyframe time replaced with 0");
        0.0
    } else {
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_curve() -> Curve<f32> {
        let mut curve = Curve::new();
        curve.insert(0.0, 0.0, EasingId::Linear);
        curve.insert(10.0, 100.0, EasingId::Linear);
        curve
    }

    #[test]
    fn test_empty_curve_returns_default() {
        let curve: Curve<Vec3> = Curve::new();
        assert_eq!(curve.evaluate(1.0), Vec3::ZERO);
        let curve: Curve<i32> = Curve::new();
        assert_eq!(curve.evaluate(1.0), 0);
    }

    #[test]
    fn test_single_keyframe_constant() {
        let curve = Curve::constant(Vec3::new(1.0, 2.0, 3.0));
        for t in [-5.0, 0.0, 0.5, 100.0] {
            assert_eq!(curve.evaluate(t), Vec3::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_boundary_clamping() {
        let curve = linear_curve();
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert_eq!(curve.evaluate(11.0), 100.0);
        assert_eq!(curve.evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn test_linear_midpoint() {
        let curve = linear_curve();
        assert!((curve.evaluate(5.0) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_int_rounding() {
        let mut curve = Curve::new();
        curve.insert(0.0, 0i32, EasingId::Linear);
        curve.insert(1.0, 3i32, EasingId::Linear);
        assert_eq!(curve.evaluate(0.4), 1);
        assert_eq!(curve.evaluate(0.5), 2);
    }

    #[test]
    fn test_uses_later_keyframe_easing() {
        let mut curve = Curve::new();
        curve.insert(0.0, 0.0f32, EasingId::EaseOutQuad);
        curve.insert(1.0, 1.0f32, EasingId::EaseInQuad);
        // 0.5 经 EaseInQuad 得 0.25
        assert!((curve.evaluate(0.5) - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_quat_shortest_arc() {
        let a = Quat::from_rotation_y(0.0);
        let b = Quat::from_rotation_y(350f32.to_radians());
        let mut curve = Curve::new();
        curve.insert(0.0, a, EasingId::Linear);
        curve.insert(1.0, b, EasingId::Linear);

        let mid = curve.evaluate(0.5);
        let expected = Quat::from_rotation_y((-5f32).to_radians());
        assert!(mid.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn test_sorted_insert_out_of_order() {
        let mut curve = Curve::new();
        curve.insert(2.0, 2.0f32, EasingId::Linear);
        curve.insert(0.0, 0.0f32, EasingId::Linear);
        curve.insert(1.0, 1.0f32, EasingId::Linear);
        let times: Vec<f32> = curve.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_equal_times_insert_after() {
        let mut curve = Curve::new();
        curve.insert(1.0, 1.0f32, EasingId::Linear);
        let index = curve.insert(1.0, 2.0f32, EasingId::Linear);
        assert_eq!(index, 1);
        assert_eq!(curve.keyframes()[1].value, 2.0);
    }

    #[test]
    fn test_set_time_reorders() {
        let mut curve = linear_curve();
        curve.insert(5.0, 20.0, EasingId::Linear);
        let new_index = curve.set_time(0, 7.0).unwrap();
        assert_eq!(new_index, 1);
        assert_eq!(curve.keyframes()[0].time, 5.0);
    }

    #[test]
    fn test_delete_marked() {
        let mut curve = linear_curve();
        curve.insert(5.0, 20.0, EasingId::Linear);
        curve.mark(1, true);
        assert_eq!(curve.delete_marked(), 1);
        assert_eq!(curve.len(), 2);
        assert!((curve.evaluate(5.0) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_deserialize_sorts() {
        let json = r#"[
            {"time": 1.0, "value": 10.0, "easing": 0},
            {"time": 0.0, "value": 0.0, "easing": 0}
        ]"#;
        let curve: Curve<f32> = serde_json::from_str(json).unwrap();
        assert_eq!(curve.keyframes()[0].time, 0.0);
        assert!((curve.evaluate(0.5) - 5.0).abs() < 0.001);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn finite_time() -> impl Strategy<Value = f32> {
            (-100.0f32..100.0).prop_filter("must be finite", |x| x.is_finite())
        }

        proptest! {
            #[test]
            fn insert_keeps_order(times in proptest::collection::vec(finite_time(), 0..32)) {
                let mut curve = Curve::new();
                for (i, t) in times.iter().enumerate() {
                    curve.insert(*t, i as f32, EasingId::Linear);
                }
                let keys = curve.keyframes();
                for pair in keys.windows(2) {
                    prop_assert!(pair[0].time <= pair[1].time);
                }
            }

            #[test]
            fn clamps_outside_range(
                values in proptest::collection::vec(-1000.0f32..1000.0, 1..16),
                offset in 0.001f32..50.0
            ) {
                let mut curve = Curve::new();
                for (i, v) in values.iter().enumerate() {
                    curve.insert(i as f32, *v, EasingId::EaseInOutCubic);
                }
                let first = curve.keyframes()[0].value;
                let last = curve.keyframes()[curve.len() - 1].value;
                prop_assert_eq!(curve.evaluate(-offset), first);
                prop_assert_eq!(curve.evaluate(curve.duration() + offset), last);
            }

            #[test]
            fn linear_stays_between_endpoints(
                a in -1000.0f32..1000.0,
                b in -1000.0f32..1000.0,
                t in 0.0f32..1.0
            ) {
                let mut curve = Curve::new();
                curve.insert(0.0, a, EasingId::Linear);
                curve.insert(1.0, b, EasingId::Linear);
                let v = curve.evaluate(t);
                prop_assert!(v >= a.min(b) - 0.01 && v <= a.max(b) + 0.01);
            }
        }
    }
}
