use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 单个粒子组实例缓冲区容量上限
pub const DEFAULT_MAX_INSTANCES_PER_GROUP: u32 = 1024;

/// 粒子系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// 每个粒子组的最大实例数（实例缓冲区固定容量）
    pub max_instances_per_group: u32,

    /// 在途帧数（每个粒子组的实例缓冲区环大小）
    pub frames_in_flight: u32,

    /// 固定时间步长（秒）
    pub fixed_delta_time: f32,

    /// 发射器未指定模型时使用的模型
    pub default_model: String,

    /// 新粒子组使用的时间通道
    pub default_time_channel: String,
}

impl_default!(ParticleConfig {
    max_instances_per_group: DEFAULT_MAX_INSTANCES_PER_GROUP,
    frames_in_flight: 2,
    fixed_delta_time: 1.0 / 60.0,
    default_model: "plane/plane.gltf".to_string(),
    default_time_channel: crate::core::DEFAULT_TIME_CHANNEL.to_string(),
});

impl ParticleConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_instances_per_group == 0 || self.max_instances_per_group > 65536 {
            return Err(ConfigError::Invalid(
                "max_instances_per_group must be within 1..=65536".to_string(),
            ));
        }
        if self.frames_in_flight == 0 || self.frames_in_flight > 4 {
            return Err(ConfigError::Invalid(
                "frames_in_flight must be within 1..=4".to_string(),
            ));
        }
        if !(self.fixed_delta_time > 0.0 && self.fixed_delta_time.is_finite()) {
            return Err(ConfigError::Invalid(
                "fixed_delta_time must be positive".to_string(),
            ));
        }
        if self.default_model.is_empty() {
            return Err(ConfigError::Invalid(
                "default_model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        let config = ParticleConfig::default();
        assert_eq!(config.max_instances_per_group, 1024);
        assert_eq!(config.frames_in_flight, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_frames_in_flight() {
        let config = ParticleConfig {
            frames_in_flight: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(_))
        ));
    }
}
