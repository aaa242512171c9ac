//! 单个粒子
//!
//! 生命周期：`Spawned → Aging → { Dead | InfiniteLifeHeld }`。
//! 粒子每帧根据归一化寿命 `t` 重新求值其曲线，然后积分位置。

use glam::{Mat4, Vec3, Vec4};

use super::init_param::ParticleInitParam;
use crate::core::utils::{euler_to_quat, make_affine, safe_normalize};

/// 粒子
#[derive(Debug, Clone)]
pub struct Particle {
    param: ParticleInitParam,

    current_time: f32,
    t: f32,
    alive: bool,

    translate: Vec3,
    rotation: Vec3,
    scale: Vec3,
    speed: f32,
    direction: Vec3,
    acceleration: Vec3,
    velocity: Vec3,
    /// 速度衰减系数（阻力修改器写入），与速率曲线相互独立
    velocity_scale: f32,
    color: Vec4,

    local_matrix: Mat4,
}

impl Particle {
    pub fn new(param: ParticleInitParam) -> Self {
        let mut particle = Self {
            param: ParticleInitParam::default(),
            current_time: 0.0,
            t: 0.0,
            alive: true,
            translate: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            speed: 0.0,
            direction: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            velocity: Vec3::ZERO,
            velocity_scale: 1.0,
            color: Vec4::ONE,
            local_matrix: Mat4::IDENTITY,
        };
        particle.initialize(param);
        particle
    }

    /// 以新参数重置粒子
    pub fn initialize(&mut self, param: ParticleInitParam) {
        self.translate = param.position;
        self.rotation = param.rotation;
        self.scale = param.size;
        self.speed = param.speed;
        self.direction = param.direction;
        self.acceleration = param.acceleration;
        self.color = param.color;

        self.velocity_scale = 1.0;
        self.alive = true;
        self.current_time = 0.0;
        self.t = 0.0;

        self.velocity = safe_normalize(self.direction) * self.speed;
        self.local_matrix = make_affine(self.scale, self.rotation, self.translate);
        self.param = param;
    }

    /// 推进一帧
    pub fn update(&mut self, delta_time: f32) {
        if !self.alive {
            return;
        }

        self.current_time += delta_time;

        if !self.param.infinite_life && self.current_time >= self.param.life_time {
            self.alive = false;
            return;
        }

        self.t = if self.param.life_time > 0.0 {
            self.current_time / self.param.life_time
        } else {
            0.0
        };

        self.apply_curves();

        self.velocity = (safe_normalize(self.direction) * self.speed
            + self.acceleration * self.current_time)
            * self.velocity_scale;

        if self.param.deceleration != 0.0 {
            self.velocity -= self.velocity * self.param.deceleration * delta_time;
        }

        self.translate += self.velocity * delta_time;

        if self.param.rotation_curve.is_empty() {
            self.rotation += self.param.rotation_speed * delta_time;
        }

        self.local_matrix = make_affine(self.scale, self.rotation, self.translate);
    }

    fn apply_curves(&mut self) {
        let t = self.t;
        let param = &self.param;

        if !param.color_curve.is_empty() {
            self.color = param.color_curve.evaluate(t).extend(self.color.w);
        }
        if !param.alpha_curve.is_empty() {
            self.color.w = param.alpha_curve.evaluate(t);
        }
        if !param.rotation_curve.is_empty() {
            self.rotation = param.rotation_curve.evaluate(t);
        }
        if !param.size_curve.is_empty() {
            self.scale = param.size_curve.evaluate(t);
        }
        if !param.speed_curve.is_empty() {
            self.speed = param.speed_curve.evaluate(t);
        }
    }

    /// 含公告板旋转的世界矩阵：先缩放，再公告板旋转，再自身旋转，最后平移
    pub fn world_matrix(&self, billboard: Mat4) -> Mat4 {
        Mat4::from_translation(self.translate)
            * Mat4::from_quat(euler_to_quat(self.rotation))
            * billboard
            * Mat4::from_scale(self.scale)
    }

    /// 强制结束
    pub fn kill(&mut self) {
        self.alive = false;
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// 归一化寿命
    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn param(&self) -> &ParticleInitParam {
        &self.param
    }

    pub fn billboard(&self) -> [bool; 3] {
        self.param.billboard
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    pub fn position(&self) -> Vec3 {
        self.translate
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.translate = position;
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn velocity_scale(&self) -> f32 {
        self.velocity_scale
    }

    /// 速度整体缩放，负值按 0 处理
    pub fn set_velocity_scale(&mut self, scale: f32) {
        self.velocity_scale = scale.max(0.0);
    }
}
