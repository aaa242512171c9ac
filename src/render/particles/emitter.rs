//! 粒子发射器
//!
//! 发射器持有发射节奏与生成参数，按时间表生成粒子并交给粒子系统中
//! 与发射器同名的粒子组。
//!
//! ## 发射窗口
//!
//! ```text
//! 0 ──── delay ──────────── delay + duration ───▶ t
//!        │  emit_per_sec 次/秒，每次 count_per_emit 个
//!        └─ looping: 到达 duration 后回到窗口起点
//! ```
//!
//! 非循环发射器在 `duration` 结束或发射次数达到 `emit_repeat_count` 后失活。

use bevy_ecs::prelude::*;
use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::init_param::ParticleInitParam;
use super::particle::Particle;
use super::system::ParticleSystem;
use crate::animation::Curve;
use crate::core::{ParticleError, ParticleResult};
use crate::impl_default;
use crate::render::pipeline::ParticleRenderSettings;
use crate::render::resources::TextureId;

// ============================================================================
// 随机取值组
// ============================================================================

/// 可在闭区间内随机取值的类型
pub trait RandomRange: Copy {
    fn sample_between<R: Rng + ?Sized>(rng: &mut R, min: Self, max: Self) -> Self;
    fn is_finite_value(&self) -> bool;
}

impl RandomRange for f32 {
    fn sample_between<R: Rng + ?Sized>(rng: &mut R, min: Self, max: Self) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        rng.gen_range(lo..=hi)
    }

    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl RandomRange for Vec3 {
    fn sample_between<R: Rng + ?Sized>(rng: &mut R, min: Self, max: Self) -> Self {
        Vec3::new(
            f32::sample_between(rng, min.x, max.x),
            f32::sample_between(rng, min.y, max.y),
            f32::sample_between(rng, min.z, max.z),
        )
    }

    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

/// 固定值或区间随机值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingGroup<T> {
    /// 为 true 时在 `[min, max]` 内随机
    pub random: bool,
    pub value: T,
    pub min: T,
    pub max: T,
}

impl<T: RandomRange> SettingGroup<T> {
    pub fn fixed(value: T) -> Self {
        Self {
            random: false,
            value,
            min: value,
            max: value,
        }
    }

    pub fn range(min: T, max: T) -> Self {
        Self {
            random: true,
            value: min,
            min,
            max,
        }
    }

    /// 按策略取值；区间端点非有限时退回固定值
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        if self.random {
            self.sample_random(rng)
        } else {
            self.value
        }
    }

    /// 忽略策略，强制在区间内随机
    pub fn sample_random<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        if !self.min.is_finite_value() || !self.max.is_finite_value() {
            return self.value;
        }
        T::sample_between(rng, self.min, self.max)
    }
}

// ============================================================================
// 设置
// ============================================================================

/// 发射形状
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmitterShape {
    /// 轴对齐盒体内均匀分布
    Box { size: Vec3 },
    /// 球面上均匀分布
    Sphere { radius: f32 },
    /// XZ 平面圆周上均匀分布
    Circle { radius: f32 },
}

impl Default for EmitterShape {
    fn default() -> Self {
        EmitterShape::Box { size: Vec3::ONE }
    }
}

impl EmitterShape {
    /// 形状局部空间中的生成位置
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            EmitterShape::Box { size } => {
                let half = size.abs() * 0.5;
                Vec3::sample_between(rng, -half, half)
            }
            EmitterShape::Sphere { radius } => {
                let z: f32 = rng.gen_range(-1.0..=1.0);
                let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
                let r = (1.0 - z * z).max(0.0).sqrt();
                Vec3::new(r * theta.cos(), z, r * theta.sin()) * radius
            }
            EmitterShape::Circle { radius } => {
                let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
                Vec3::new(theta.cos() * radius, 0.0, theta.sin() * radius)
            }
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            EmitterShape::Box { size } => size.is_finite(),
            EmitterShape::Sphere { radius } | EmitterShape::Circle { radius } => {
                radius.is_finite() && radius >= 0.0
            }
        }
    }
}

/// 初始方向策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleDirection {
    /// 由形状中心指向生成点
    Outward,
    /// 由生成点指向形状中心
    Inward,
    /// 在方向区间内随机
    #[default]
    Random,
    /// 使用方向的固定值
    Fixed,
}

/// 寿命策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifeTimePolicy {
    Infinite,
    Random,
    #[default]
    Fixed,
}

/// 发射器设置（可 JSON 持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterSettings {
    /// 发射器名，同时是目标粒子组名
    pub name: String,
    pub model: String,
    pub texture: TextureId,
    pub render: ParticleRenderSettings,

    pub shape: EmitterShape,
    pub direction_policy: ParticleDirection,
    pub life_time_policy: LifeTimePolicy,

    /// 每秒发射次数
    pub emit_per_sec: u32,
    /// 每次发射的粒子数
    pub count_per_emit: u32,
    /// 非循环时的最大发射次数，0 表示不限
    pub emit_repeat_count: u32,
    /// 首次发射前的延迟（秒）
    pub delay: f32,
    /// 发射窗口长度，`None` 表示无限
    pub duration: Option<f32>,
    pub looping: bool,

    pub position: Vec3,
    pub offset: Vec3,

    pub life_time: SettingGroup<f32>,
    pub size: SettingGroup<Vec3>,
    pub rotation: SettingGroup<Vec3>,
    pub rotation_speed: SettingGroup<Vec3>,
    pub speed: SettingGroup<f32>,
    pub deceleration: SettingGroup<f32>,
    pub direction: SettingGroup<Vec3>,
    pub acceleration: SettingGroup<Vec3>,
    pub color: SettingGroup<Vec3>,
    pub alpha: SettingGroup<f32>,

    pub size_curve: Curve<Vec3>,
    pub rotation_curve: Curve<Vec3>,
    pub speed_curve: Curve<f32>,
    pub color_curve: Curve<Vec3>,
    pub alpha_curve: Curve<f32>,

    pub billboard: [bool; 3],
    pub modifiers: Vec<String>,
    /// 目标粒子组使用的时间通道
    pub time_channel: Option<String>,
}

impl_default!(EmitterSettings {
    name: "emitter".to_string(),
    model: "plane/plane.gltf".to_string(),
    texture: TextureId::default(),
    render: ParticleRenderSettings::default(),
    shape: EmitterShape::default(),
    direction_policy: ParticleDirection::default(),
    life_time_policy: LifeTimePolicy::default(),
    emit_per_sec: 10,
    count_per_emit: 1,
    emit_repeat_count: 0,
    delay: 0.0,
    duration: None,
    looping: true,
    position: Vec3::ZERO,
    offset: Vec3::ZERO,
    life_time: SettingGroup::fixed(1.0),
    size: SettingGroup::fixed(Vec3::ONE),
    rotation: SettingGroup::fixed(Vec3::ZERO),
    rotation_speed: SettingGroup::fixed(Vec3::ZERO),
    speed: SettingGroup::fixed(1.0),
    deceleration: SettingGroup::fixed(0.0),
    direction: SettingGroup::range(Vec3::splat(-1.0), Vec3::ONE),
    acceleration: SettingGroup::fixed(Vec3::ZERO),
    color: SettingGroup::fixed(Vec3::ONE),
    alpha: SettingGroup::fixed(1.0),
    size_curve: Curve::new(),
    rotation_curve: Curve::new(),
    speed_curve: Curve::new(),
    color_curve: Curve::new(),
    alpha_curve: Curve::new(),
    billboard: [true; 3],
    modifiers: Vec::new(),
    time_channel: None,
});

impl EmitterSettings {
    pub fn validate(&self) -> ParticleResult<()> {
        let invalid = |msg: String| Err(ParticleError::InvalidEmitter(msg));

        if self.name.is_empty() {
            return invalid("name must not be empty".to_string());
        }
        if self.model.is_empty() {
            return invalid(format!("{}: model must not be empty", self.name));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return invalid(format!("{}: delay must be >= 0, got {}", self.name, self.delay));
        }
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return invalid(format!(
                    "{}: duration must be > 0, got {}",
                    self.name, duration
                ));
            }
        }
        if !self.shape.is_valid() {
            return invalid(format!("{}: invalid shape {:?}", self.name, self.shape));
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> ParticleResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ParticleError::Persistence(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> ParticleResult<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ParticleError::Persistence(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ParticleResult<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| ParticleError::Persistence(e.to_string()))
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> ParticleResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ParticleError::Persistence(e.to_string()))?;
        Self::from_json_str(&json)
    }
}

// ============================================================================
// 发射器
// ============================================================================

/// 粒子发射器组件
#[derive(Component)]
pub struct ParticleEmitter {
    pub settings: EmitterSettings,
    rng: StdRng,

    /// 自上次（循环）起点以来的时间
    elapsed: f32,
    /// 发射次数累加器
    emission_accumulator: f32,
    /// 本轮已发射次数
    emitted_events: u32,

    active: bool,
    alive: bool,
}

impl ParticleEmitter {
    pub fn new(settings: EmitterSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// 使用固定种子（结果可复现）
    pub fn with_seed(settings: EmitterSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: EmitterSettings, rng: StdRng) -> Self {
        Self {
            settings,
            rng,
            elapsed: 0.0,
            emission_accumulator: 0.0,
            emitted_events: 0,
            active: true,
            alive: true,
        }
    }

    /// 推进发射时钟并把新粒子交给粒子系统，返回发射的粒子数
    pub fn update(&mut self, delta_time: f32, system: &mut ParticleSystem) -> ParticleResult<u32> {
        let count = self.particles_to_emit(delta_time);
        if count == 0 {
            return Ok(0);
        }
        let particles = self.generate_particles(count);
        self.submit(particles, system)?;
        Ok(count)
    }

    /// 计算本帧应发射的粒子数并推进内部状态
    pub fn particles_to_emit(&mut self, delta_time: f32) -> u32 {
        if !self.active || !self.alive || delta_time <= 0.0 {
            return 0;
        }

        let delay = self.settings.delay;
        let previous = self.elapsed;
        self.elapsed += delta_time;
        if self.elapsed < delay {
            return 0;
        }

        // 只计入延迟之后的时间
        let mut window_dt = delta_time - (delay - previous).max(0.0);

        if let Some(duration) = self.settings.duration {
            let local = self.elapsed - delay;
            if local > duration {
                if self.settings.looping {
                    // 窗口首尾相接：本帧时间全部计入，时钟可一次跨越多个窗口
                    self.elapsed = if duration > 0.0 {
                        delay + local.rem_euclid(duration)
                    } else {
                        delay
                    };
                    self.emitted_events = 0;
                    tracing::trace!(target: "particles", emitter = %self.settings.name, "Emitter loop");
                } else {
                    window_dt = (window_dt - (local - duration)).max(0.0);
                    let events = self.accumulate(window_dt);
                    self.finish();
                    return events * self.settings.count_per_emit;
                }
            }
        }

        let events = self.accumulate(window_dt);
        let count = events * self.settings.count_per_emit;

        if !self.settings.looping
            && self.settings.emit_repeat_count > 0
            && self.emitted_events >= self.settings.emit_repeat_count
        {
            self.finish();
        }
        count
    }

    /// 累加发射次数，受 `emit_repeat_count` 限制
    fn accumulate(&mut self, window_dt: f32) -> u32 {
        self.emission_accumulator += self.settings.emit_per_sec as f32 * window_dt;
        let mut events = self.emission_accumulator.floor() as u32;
        self.emission_accumulator -= events as f32;

        if !self.settings.looping && self.settings.emit_repeat_count > 0 {
            let remaining = self
                .settings
                .emit_repeat_count
                .saturating_sub(self.emitted_events);
            events = events.min(remaining);
        }
        self.emitted_events += events;
        events
    }

    fn finish(&mut self) {
        self.active = false;
        self.alive = false;
        tracing::debug!(target: "particles", emitter = %self.settings.name, "Emitter finished");
    }

    /// 立即发射 `count` 个粒子（不受发射节奏影响）
    pub fn emit_burst(&mut self, count: u32, system: &mut ParticleSystem) -> ParticleResult<u32> {
        if !self.alive || count == 0 {
            return Ok(0);
        }
        let particles = self.generate_particles(count);
        self.submit(particles, system)?;
        Ok(count)
    }

    fn submit(&self, particles: Vec<Particle>, system: &mut ParticleSystem) -> ParticleResult<()> {
        let settings = &self.settings;
        system.add_particles(
            &settings.name,
            &settings.model,
            particles,
            settings.render,
            settings.texture,
            &settings.modifiers,
        )?;
        if let Some(channel) = &settings.time_channel {
            system.set_group_time_channel(&settings.name, channel)?;
        }
        Ok(())
    }

    /// 按当前设置生成粒子
    pub fn generate_particles(&mut self, count: u32) -> Vec<Particle> {
        (0..count)
            .map(|_| Particle::new(self.generate_param()))
            .collect()
    }

    fn generate_param(&mut self) -> ParticleInitParam {
        let s = &self.settings;
        let rng = &mut self.rng;

        let local = s.shape.sample_position(rng);
        let direction = match s.direction_policy {
            ParticleDirection::Outward => outward(local),
            ParticleDirection::Inward => -outward(local),
            ParticleDirection::Random => s.direction.sample_random(rng),
            ParticleDirection::Fixed => s.direction.value,
        };

        let (life_time, infinite_life) = match s.life_time_policy {
            LifeTimePolicy::Infinite => (s.life_time.value, true),
            LifeTimePolicy::Random => (s.life_time.sample_random(rng), false),
            LifeTimePolicy::Fixed => (s.life_time.value, false),
        };

        let rgb = s.color.sample(rng);
        let alpha = s.alpha.sample(rng);

        ParticleInitParam {
            life_time,
            infinite_life,
            size: s.size.sample(rng),
            rotation: s.rotation.sample(rng),
            rotation_speed: s.rotation_speed.sample(rng),
            position: s.position + s.offset + local,
            speed: s.speed.sample(rng),
            direction,
            acceleration: s.acceleration.sample(rng),
            deceleration: s.deceleration.sample(rng),
            color: Vec4::new(rgb.x, rgb.y, rgb.z, alpha),
            billboard: s.billboard,
            size_curve: s.size_curve.clone(),
            rotation_curve: s.rotation_curve.clone(),
            speed_curve: s.speed_curve.clone(),
            color_curve: s.color_curve.clone(),
            alpha_curve: s.alpha_curve.clone(),
        }
    }

    /// 回到初始状态（保持激活）
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.emission_accumulator = 0.0;
        self.emitted_events = 0;
        self.active = true;
        self.alive = true;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn add_modifier(&mut self, name: &str) {
        if !self.has_modifier(name) {
            self.settings.modifiers.push(name.to_string());
        }
    }

    pub fn remove_modifier(&mut self, name: &str) -> bool {
        let before = self.settings.modifiers.len();
        self.settings.modifiers.retain(|m| m != name);
        before != self.settings.modifiers.len()
    }

    pub fn has_modifier(&self, name: &str) -> bool {
        self.settings.modifiers.iter().any(|m| m == name)
    }
}

fn outward(local: Vec3) -> Vec3 {
    let direction = local.normalize_or_zero();
    if direction == Vec3::ZERO {
        Vec3::Y
    } else {
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter(settings: EmitterSettings) -> ParticleEmitter {
        ParticleEmitter::with_seed(settings, 7)
    }

    #[test]
    fn test_setting_group_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(SettingGroup::fixed(2.0f32).sample(&mut rng), 2.0);

        // 端点颠倒时交换
        let group = SettingGroup::range(5.0f32, 1.0);
        for _ in 0..100 {
            let v = group.sample(&mut rng);
            assert!((1.0..=5.0).contains(&v));
        }

        let broken = SettingGroup {
            random: true,
            value: 3.0f32,
            min: f32::NAN,
            max: 1.0,
        };
        assert_eq!(broken.sample(&mut rng), 3.0);
    }

    #[test]
    fn test_shapes() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let p = EmitterShape::Sphere { radius: 2.0 }.sample_position(&mut rng);
            assert!((p.length() - 2.0).abs() < 1e-3);

            let p = EmitterShape::Circle { radius: 1.5 }.sample_position(&mut rng);
            assert_eq!(p.y, 0.0);
            assert!((p.length() - 1.5).abs() < 1e-3);

            let p = EmitterShape::Box {
                size: Vec3::new(2.0, 4.0, 6.0),
            }
            .sample_position(&mut rng);
            assert!(p.abs().cmple(Vec3::new(1.0, 2.0, 3.0)).all());
        }
    }

    #[test]
    fn test_cadence() {
        let mut e = emitter(EmitterSettings {
            emit_per_sec: 10,
            count_per_emit: 2,
            ..Default::default()
        });
        assert_eq!(e.particles_to_emit(0.1), 2);
        assert_eq!(e.particles_to_emit(0.05), 0);
        assert_eq!(e.particles_to_emit(0.05), 2);
    }

    #[test]
    fn test_delay() {
        let mut e = emitter(EmitterSettings {
            emit_per_sec: 10,
            delay: 0.5,
            ..Default::default()
        });
        for _ in 0..4 {
            assert_eq!(e.particles_to_emit(0.1), 0);
        }
        // 0.5 之前的时间不计入
        assert_eq!(e.particles_to_emit(0.25), 1);
    }

    #[test]
    fn test_inactive_emits_nothing() {
        let mut e = emitter(EmitterSettings::default());
        e.set_active(false);
        assert_eq!(e.particles_to_emit(10.0), 0);
        assert!(e.is_alive());
    }

    #[test]
    fn test_non_looping_duration_ends() {
        let mut e = emitter(EmitterSettings {
            emit_per_sec: 10,
            duration: Some(0.55),
            looping: false,
            ..Default::default()
        });
        let mut total = 0;
        for _ in 0..10 {
            total += e.particles_to_emit(0.1);
        }
        assert_eq!(total, 5);
        assert!(!e.is_alive());
        assert!(!e.is_active());
    }

    #[test]
    fn test_repeat_count_limits_events() {
        let mut e = emitter(EmitterSettings {
            emit_per_sec: 10,
            count_per_emit: 3,
            emit_repeat_count: 2,
            looping: false,
            ..Default::default()
        });
        assert_eq!(e.particles_to_emit(1.0), 6);
        assert!(!e.is_alive());
        assert_eq!(e.particles_to_emit(1.0), 0);

        e.reset();
        assert!(e.is_alive());
        assert_eq!(e.particles_to_emit(0.1), 3);
    }

    #[test]
    fn test_looping_keeps_emitting() {
        let mut e = emitter(EmitterSettings {
            emit_per_sec: 10,
            duration: Some(0.3),
            looping: true,
            ..Default::default()
        });
        let mut total = 0;
        for _ in 0..20 {
            total += e.particles_to_emit(0.1);
        }
        assert_eq!(total, 20);
        assert!(e.is_alive());
        assert!(e.elapsed() <= 0.3 + 1e-4);
    }

    #[test]
    fn test_looping_window_wrap_matches_unbounded_rate() {
        let looping = EmitterSettings {
            emit_per_sec: 10,
            duration: Some(0.25),
            looping: true,
            ..Default::default()
        };
        let unbounded = EmitterSettings {
            duration: None,
            ..looping.clone()
        };
        let mut a = emitter(looping);
        let mut b = emitter(unbounded);

        let (mut looped, mut endless) = (0, 0);
        for _ in 0..100 {
            looped += a.particles_to_emit(0.1);
            endless += b.particles_to_emit(0.1);
        }
        assert_eq!(endless, 100);
        assert_eq!(looped, endless);
    }

    #[test]
    fn test_looping_large_step_crosses_several_windows() {
        let mut e = emitter(EmitterSettings {
            emit_per_sec: 10,
            duration: Some(0.25),
            looping: true,
            ..Default::default()
        });
        assert_eq!(e.particles_to_emit(1.0), 10);
        assert!(e.elapsed() < 0.25);
        assert!(e.is_alive());
    }

    #[test]
    fn test_generated_params() {
        let mut e = emitter(EmitterSettings {
            shape: EmitterShape::Sphere { radius: 1.0 },
            direction_policy: ParticleDirection::Outward,
            life_time_policy: LifeTimePolicy::Random,
            life_time: SettingGroup::range(1.0, 2.0),
            position: Vec3::new(10.0, 0.0, 0.0),
            alpha: SettingGroup::fixed(0.5),
            ..Default::default()
        });
        for particle in e.generate_particles(20) {
            let param = particle.param();
            let local = param.position - Vec3::new(10.0, 0.0, 0.0);
            assert!((param.direction - local.normalize()).length() < 1e-3);
            assert!((1.0..=2.0).contains(&param.life_time));
            assert!(!param.infinite_life);
            assert_eq!(param.color.w, 0.5);
        }
    }

    #[test]
    fn test_outward_at_center() {
        assert_eq!(outward(Vec3::ZERO), Vec3::Y);
    }

    #[test]
    fn test_modifier_list() {
        let mut e = emitter(EmitterSettings::default());
        e.add_modifier("gravity");
        e.add_modifier("gravity");
        assert!(e.has_modifier("gravity"));
        assert_eq!(e.settings.modifiers.len(), 1);
        assert!(e.remove_modifier("gravity"));
        assert!(!e.remove_modifier("gravity"));
    }

    #[test]
    fn test_settings_validation_and_json() {
        let settings = EmitterSettings {
            name: "smoke".to_string(),
            duration: Some(2.0),
            shape: EmitterShape::Circle { radius: 3.0 },
            modifiers: vec!["wind".to_string()],
            ..Default::default()
        };
        let json = settings.to_json_string().unwrap();
        let loaded = EmitterSettings::from_json_str(&json).unwrap();
        assert_eq!(loaded, settings);

        let bad = EmitterSettings {
            duration: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ParticleError::InvalidEmitter(_))));

        let err = EmitterSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ParticleError::Persistence(_)));
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emitter.json");
        let settings = EmitterSettings {
            name: "sparks".to_string(),
            ..Default::default()
        };
        settings.save_json(&path).unwrap();
        assert_eq!(EmitterSettings::load_json(&path).unwrap(), settings);
    }
}
