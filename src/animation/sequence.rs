//! 动画序列
//!
//! 一组带标签的参数轨道共享同一时钟。
//! 非循环序列的时钟钳制在 `[0, max_play_time]`，循环序列在区间内回绕。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::easing::EasingId;
use super::track::{ParameterTrack, ParameterType, ParameterValue};
use crate::core::{AnimationError, AnimationResult};

/// 序列中的一条命名轨道
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTrack {
    pub label: String,
    pub track: ParameterTrack,
    #[serde(skip)]
    pub marked: bool,
}

/// 动画序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSequence {
    label: String,
    #[serde(skip)]
    current_time: f32,
    max_play_time: f32,
    looping: bool,
    tracks: Vec<SequenceTrack>,
}

impl AnimationSequence {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            current_time: 0.0,
            max_play_time: 1.0,
            looping: false,
            tracks: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn set_current_time(&mut self, time: f32) {
        self.current_time = time.clamp(0.0, self.max_play_time);
    }

    pub fn max_play_time(&self) -> f32 {
        self.max_play_time
    }

    pub fn set_max_play_time(&mut self, max_play_time: f32) {
        self.max_play_time = max_play_time.max(0.0);
        self.current_time = self.current_time.min(self.max_play_time);
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// 推进时钟
    pub fn update(&mut self, delta_time: f32) {
        let next = self.current_time + delta_time;
        self.current_time = if self.looping && self.max_play_time > 0.0 {
            next.rem_euclid(self.max_play_time)
        } else {
            next.clamp(0.0, self.max_play_time)
        };
    }

    /// 非循环且时钟到达终点
    pub fn is_end(&self) -> bool {
        if self.looping {
            return false;
        }
        self.tracks.is_empty() || self.current_time >= self.max_play_time
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
    }

    // ========================================================================
    // 轨道管理
    // ========================================================================

    /// 创建轨道并在 0 时刻写入初始值
    pub fn create_track(
        &mut self,
        label: &str,
        initial: ParameterValue,
    ) -> AnimationResult<&mut ParameterTrack> {
        if self.has_track(label) {
            return Err(AnimationError::DuplicateLabel(label.to_string()));
        }
        let mut track = ParameterTrack::for_value(initial);
        track.add_keyframe(0.0, initial, EasingId::Linear)?;
        self.tracks.push(SequenceTrack {
            label: label.to_string(),
            track,
            marked: false,
        });
        let index = self.tracks.len() - 1;
        Ok(&mut self.tracks[index].track)
    }

    /// 插入轨道，已存在同名轨道时替换并返回旧轨道
    pub fn insert_track(&mut self, label: &str, track: ParameterTrack) -> Option<ParameterTrack> {
        match self.tracks.iter_mut().find(|t| t.label == label) {
            Some(existing) => Some(std::mem::replace(&mut existing.track, track)),
            None => {
                self.tracks.push(SequenceTrack {
                    label: label.to_string(),
                    track,
                    marked: false,
                });
                None
            }
        }
    }

    pub fn has_track(&self, label: &str) -> bool {
        self.tracks.iter().any(|t| t.label == label)
    }

    pub fn track(&self, label: &str) -> AnimationResult<&ParameterTrack> {
        self.tracks
            .iter()
            .find(|t| t.label == label)
            .map(|t| &t.track)
            .ok_or_else(|| AnimationError::UnknownLabel(label.to_string()))
    }

    pub fn track_mut(&mut self, label: &str) -> AnimationResult<&mut ParameterTrack> {
        self.tracks
            .iter_mut()
            .find(|t| t.label == label)
            .map(|t| &mut t.track)
            .ok_or_else(|| AnimationError::UnknownLabel(label.to_string()))
    }

    /// 轨道标签（插入顺序）
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.label.as_str())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn remove_track(&mut self, label: &str) -> Option<ParameterTrack> {
        let index = self.tracks.iter().position(|t| t.label == label)?;
        Some(self.tracks.remove(index).track)
    }

    /// 标记轨道待删除
    pub fn mark_for_deletion(&mut self, label: &str) -> bool {
        match self.tracks.iter_mut().find(|t| t.label == label) {
            Some(t) => {
                t.marked = true;
                true
            }
            None => false,
        }
    }

    /// 删除带标记的轨道以及各轨道内带标记的关键帧
    pub fn delete_marked(&mut self) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| !t.marked);
        for t in &mut self.tracks {
            t.track.delete_marked();
        }
        before - self.tracks.len()
    }

    // ========================================================================
    // 取值
    // ========================================================================

    /// 当前时刻的值
    pub fn value(&self, label: &str) -> AnimationResult<ParameterValue> {
        Ok(self.track(label)?.evaluate(self.current_time))
    }

    /// 当前时刻的具体类型值
    pub fn get<T: ParameterType>(&self, label: &str) -> AnimationResult<T> {
        self.track(label)?.evaluate_as::<T>(self.current_time)
    }

    /// 当前时刻所有轨道的值
    pub fn values(&self) -> Vec<(&str, ParameterValue)> {
        self.tracks
            .iter()
            .map(|t| (t.label.as_str(), t.track.evaluate(self.current_time)))
            .collect()
    }

    // ========================================================================
    // 持久化
    // ========================================================================

    pub fn to_json_string(&self) -> AnimationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnimationError::Serialization(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> AnimationResult<Self> {
        serde_json::from_str(content).map_err(|e| AnimationError::Serialization(e.to_string()))
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> AnimationResult<()> {
        let content = self.to_json_string()?;
        fs::write(path, content).map_err(|e| AnimationError::Serialization(e.to_string()))
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> AnimationResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| AnimationError::Serialization(e.to_string()))?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn fade_sequence() -> AnimationSequence {
        let mut sequence = AnimationSequence::new("fade");
        sequence.set_max_play_time(2.0);
        let alpha = sequence
            .create_track("alpha", ParameterValue::Float(1.0))
            .unwrap();
        alpha
            .add_keyframe(2.0, ParameterValue::Float(0.0), EasingId::Linear)
            .unwrap();
        sequence
    }

    #[test]
    fn test_update_clamps() {
        let mut sequence = fade_sequence();
        sequence.update(5.0);
        assert_eq!(sequence.current_time(), 2.0);
        assert!(sequence.is_end());

        sequence.update(-10.0);
        assert_eq!(sequence.current_time(), 0.0);
    }

    #[test]
    fn test_looping_wraps() {
        let mut sequence = fade_sequence();
        sequence.set_looping(true);
        sequence.update(2.5);
        assert!((sequence.current_time() - 0.5).abs() < 0.001);
        assert!(!sequence.is_end());
    }

    #[test]
    fn test_get_value() {
        let mut sequence = fade_sequence();
        sequence.update(1.0);
        let alpha: f32 = sequence.get("alpha").unwrap();
        assert!((alpha - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_unknown_label() {
        let sequence = fade_sequence();
        assert_eq!(
            sequence.value("missing"),
            Err(AnimationError::UnknownLabel("missing".to_string()))
        );
    }

    #[test]
    fn test_wrong_type_get() {
        let sequence = fade_sequence();
        assert!(matches!(
            sequence.get::<Vec3>("alpha"),
            Err(AnimationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_label() {
        let mut sequence = fade_sequence();
        let result = sequence.create_track("alpha", ParameterValue::Int(1));
        assert!(matches!(result, Err(AnimationError::DuplicateLabel(_))));
    }

    #[test]
    fn test_delete_marked_keeps_order() {
        let mut sequence = fade_sequence();
        sequence
            .create_track("offset", ParameterValue::Vec3(Vec3::ZERO))
            .unwrap();
        sequence.create_track("frame", ParameterValue::Int(0)).unwrap();
        assert!(sequence.mark_for_deletion("offset"));
        assert_eq!(sequence.delete_marked(), 1);
        let labels: Vec<&str> = sequence.labels().collect();
        assert_eq!(labels, vec!["alpha", "frame"]);
    }

    #[test]
    fn test_empty_sequence_is_end() {
        let sequence = AnimationSequence::new("empty");
        assert!(sequence.is_end());
    }

    #[test]
    fn test_json_round_trip() {
        let sequence = fade_sequence();
        let json = sequence.to_json_string().unwrap();
        let parsed = AnimationSequence::from_json_str(&json).unwrap();
        assert_eq!(parsed.max_play_time(), 2.0);
        assert_eq!(parsed.track("alpha").unwrap().len(), 2);
    }
}
