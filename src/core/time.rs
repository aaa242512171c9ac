//! 时间通道
//!
//! 命名的时间缩放通道。粒子组通过通道名读取自己的 delta time，
//! 从而实现局部慢动作 / 暂停等效果。

use std::collections::HashMap;

/// 默认通道名
pub const DEFAULT_TIME_CHANNEL: &str = "default";

/// 命名时间缩放表
///
/// 未注册的通道缩放为 1.0。
#[derive(Debug, Clone)]
pub struct TimeChannels {
    scales: HashMap<String, f32>,
}

impl Default for TimeChannels {
    fn default() -> Self {
        let mut scales = HashMap::new();
        scales.insert(DEFAULT_TIME_CHANNEL.to_string(), 1.0);
        Self { scales }
    }
}

impl TimeChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置通道缩放（负值按 0 处理）
    pub fn set_scale(&mut self, channel: &str, scale: f32) {
        self.scales.insert(channel.to_string(), scale.max(0.0));
    }

    /// 获取通道缩放
    pub fn scale(&self, channel: &str) -> f32 {
        self.scales.get(channel).copied().unwrap_or(1.0)
    }

    /// 计算通道上的 delta time
    pub fn delta(&self, channel: &str, dt: f32) -> f32 {
        dt * self.scale(channel)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.scales.contains_key(channel)
    }

    pub fn remove(&mut self, channel: &str) -> Option<f32> {
        if channel == DEFAULT_TIME_CHANNEL {
            return None;
        }
        self.scales.remove(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_channel_scales_by_one() {
        let channels = TimeChannels::new();
        assert_eq!(channels.delta("ui", 0.5), 0.5);
    }

    #[test]
    fn test_scaled_channel() {
        let mut channels = TimeChannels::new();
        channels.set_scale("slow", 0.25);
        assert!((channels.delta("slow", 1.0) - 0.25).abs() < 0.001);

        channels.set_scale("slow", -3.0);
        assert_eq!(channels.scale("slow"), 0.0);
    }

    #[test]
    fn test_default_channel_cannot_be_removed() {
        let mut channels = TimeChannels::new();
        assert!(channels.remove(DEFAULT_TIME_CHANNEL).is_none());
        assert!(channels.contains(DEFAULT_TIME_CHANNEL));
    }
}
