use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::animation::Curve;
use crate::impl_default;

/// 粒子生成时的参数快照
///
/// 空曲线表示该属性不随生命周期变化；非空曲线以归一化生命周期 `t ∈ [0,1]` 求值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleInitParam {
    /// 寿命（秒）
    pub life_time: f32,
    /// 无限寿命
    pub infinite_life: bool,

    /// 初始缩放
    pub size: Vec3,
    /// 初始欧拉旋转（弧度）
    pub rotation: Vec3,
    /// 旋转速度（弧度/秒），旋转曲线为空时生效
    pub rotation_speed: Vec3,
    /// 初始位置
    pub position: Vec3,
    /// 速率
    pub speed: f32,
    /// 方向（不要求归一化）
    pub direction: Vec3,
    /// 加速度（重力等）
    pub acceleration: Vec3,
    /// 减速系数（每秒）
    pub deceleration: f32,
    /// 初始颜色
    pub color: Vec4,
    /// 公告板轴开关 xyz
    pub billboard: [bool; 3],

    /// 缩放曲线
    pub size_curve: Curve<Vec3>,
    /// 旋转曲线
    pub rotation_curve: Curve<Vec3>,
    /// 速率曲线
    pub speed_curve: Curve<f32>,
    /// RGB 曲线
    pub color_curve: Curve<Vec3>,
    /// Alpha 曲线
    pub alpha_curve: Curve<f32>,
}

impl_default!(ParticleInitParam {
    life_time: 1.0,
    infinite_life: false,
    size: Vec3::ONE,
    rotation: Vec3::ZERO,
    rotation_speed: Vec3::ZERO,
    position: Vec3::ZERO,
    speed: 0.0,
    direction: Vec3::ZERO,
    acceleration: Vec3::ZERO,
    deceleration: 0.0,
    color: Vec4::ONE,
    billboard: [false; 3],
    size_curve: Curve::new(),
    rotation_curve: Curve::new(),
    speed_curve: Curve::new(),
    color_curve: Curve::new(),
    alpha_curve: Curve::new(),
});

impl ParticleInitParam {
    pub fn with_life_time(mut self, life_time: f32) -> Self {
        self.life_time = life_time;
        self
    }

    pub fn with_infinite_life(mut self) -> Self {
        self.infinite_life = true;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, direction: Vec3, speed: f32) -> Self {
        self.direction = direction;
        self.speed = speed;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_billboard(mut self, billboard: [bool; 3]) -> Self {
        self.billboard = billboard;
        self
    }
}
