//! 粒子修改器管线
//!
//! 修改器在粒子自身更新之前作用于整个粒子组。粒子每帧会由
//! `direction * speed + acceleration * age` 重新计算速度，
//! 因此内置修改器直接作用于位置、方向与速率。
//!
//! 修改器按名称通过工厂创建，并在系统范围内缓存复用。

use glam::{Quat, Vec3};
use std::collections::HashMap;

use super::particle::Particle;

/// 修改器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Gravity,
    Wind,
    Drag,
    Attractor,
    Vortex,
    GroundCollision,
    Custom,
}

/// 粒子修改器
pub trait ParticleModifier: Send + Sync {
    /// 作用于一组存活粒子
    fn apply(&mut self, particles: &mut [Particle], delta_time: f32);

    fn kind(&self) -> ModifierKind {
        ModifierKind::Custom
    }
}

/// 修改器工厂
pub trait ModifierFactory: Send + Sync {
    /// 按名称创建修改器，未知名称返回 `None`
    fn create(&self, name: &str) -> Option<Box<dyn ParticleModifier>>;
}

// ============================================================================
// 内置修改器
// ============================================================================

/// 重力：等效恒定加速度的位移
#[derive(Debug, Clone, Copy)]
pub struct GravityModifier {
    pub gravity: Vec3,
}

impl ParticleModifier for GravityModifier {
    fn apply(&mut self, particles: &mut [Particle], delta_time: f32) {
        for p in particles.iter_mut() {
            let age = p.current_time() + delta_time;
            p.set_position(p.position() + self.gravity * age * delta_time);
        }
    }

    fn kind(&self) -> ModifierKind {
        ModifierKind::Gravity
    }
}

/// 风：恒定速度平移
#[derive(Debug, Clone, Copy)]
pub struct WindModifier {
    pub velocity: Vec3,
}

impl ParticleModifier for WindModifier {
    fn apply(&mut self, particles: &mut [Particle], delta_time: f32) {
        let offset = self.velocity * delta_time;
        for p in particles.iter_mut() {
            p.set_position(p.position() + offset);
        }
    }

    fn kind(&self) -> ModifierKind {
        ModifierKind::Wind
    }
}

/// 阻力：速度缩放系数按系数衰减
///
/// 作用于 `velocity_scale` 而不是速率，因此速率曲线驱动的粒子同样会减速。
#[derive(Debug, Clone, Copy)]
pub struct DragModifier {
    pub coefficient: f32,
}

impl ParticleModifier for DragModifier {
    fn apply(&mut self, particles: &mut [Particle], delta_time: f32) {
        let factor = (1.0 - self.coefficient * delta_time).max(0.0);
        for p in particles.iter_mut() {
            p.set_velocity_scale(p.velocity_scale() * factor);
        }
    }

    fn kind(&self) -> ModifierKind {
        ModifierKind::Drag
    }
}

/// 吸引点：把方向逐渐偏向中心
#[derive(Debug, Clone, Copy)]
pub struct AttractorModifier {
    pub center: Vec3,
    pub strength: f32,
}

impl ParticleModifier for AttractorModifier {
    fn apply(&mut self, particles: &mut [Particle], delta_time: f32) {
        for p in particles.iter_mut() {
            let to_center = (self.center - p.position()).normalize_or_zero();
            let steered = p.direction().normalize_or_zero() + to_center * self.strength * delta_time;
            p.set_direction(steered);
        }
    }

    fn kind(&self) -> ModifierKind {
        ModifierKind::Attractor
    }
}

/// 漩涡：绕轴旋转位置
#[derive(Debug, Clone, Copy)]
pub struct VortexModifier {
    pub center: Vec3,
    pub axis: Vec3,
    /// 角速度（弧度/秒）
    pub angular_speed: f32,
}

impl ParticleModifier for VortexModifier {
    fn apply(&mut self, particles: &mut [Particle], delta_time: f32) {
        let axis = self.axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        let rotation = Quat::from_axis_angle(axis, self.angular_speed * delta_time);
        for p in particles.iter_mut() {
            let local = p.position() - self.center;
            p.set_position(self.center + rotation * local);
        }
    }

    fn kind(&self) -> ModifierKind {
        ModifierKind::Vortex
    }
}

/// 地面碰撞：低于平面时钳制高度并反弹方向
#[derive(Debug, Clone, Copy)]
pub struct GroundCollisionModifier {
    pub height: f32,
    /// 反弹系数 `[0,1]`
    pub restitution: f32,
}

impl ParticleModifier for GroundCollisionModifier {
    fn apply(&mut self, particles: &mut [Particle], _delta_time: f32) {
        for p in particles.iter_mut() {
            let mut position = p.position();
            if position.y >= self.height {
                continue;
            }
            position.y = self.height;
            p.set_position(position);

            let mut direction = p.direction();
            if direction.y < 0.0 {
                direction.y = -direction.y * self.restitution;
                p.set_direction(direction);
            }
        }
    }

    fn kind(&self) -> ModifierKind {
        ModifierKind::GroundCollision
    }
}

// ============================================================================
// 工厂
// ============================================================================

type ModifierConstructor = Box<dyn Fn() -> Box<dyn ParticleModifier> + Send + Sync>;

/// 基于名称注册表的修改器工厂
#[derive(Default)]
pub struct ModifierRegistry {
    constructors: HashMap<String, ModifierConstructor>,
}

impl ModifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预注册内置修改器
    ///
    /// `gravity` `wind` `drag` `attractor` `vortex` `ground`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("gravity", || GravityModifier {
            gravity: Vec3::new(0.0, -9.8, 0.0),
        });
        registry.register("wind", || WindModifier {
            velocity: Vec3::new(1.0, 0.0, 0.0),
        });
        registry.register("drag", || DragModifier { coefficient: 0.5 });
        registry.register("attractor", || AttractorModifier {
            center: Vec3::ZERO,
            strength: 1.0,
        });
        registry.register("vortex", || VortexModifier {
            center: Vec3::ZERO,
            axis: Vec3::Y,
            angular_speed: std::f32::consts::PI,
        });
        registry.register("ground", || GroundCollisionModifier {
            height: 0.0,
            restitution: 0.5,
        });
        registry
    }

    /// 注册（或覆盖）一个修改器构造函数
    pub fn register<M, F>(&mut self, name: &str, constructor: F)
    where
        M: ParticleModifier + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.constructors.insert(
            name.to_string(),
            Box::new(move || Box::new(constructor()) as Box<dyn ParticleModifier>),
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(|k| k.as_str())
    }
}

impl ModifierFactory for ModifierRegistry {
    fn create(&self, name: &str) -> Option<Box<dyn ParticleModifier>> {
        self.constructors.get(name).map(|ctor| ctor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Curve, EasingId};
    use crate::render::particles::ParticleInitParam;

    fn particle_at(position: Vec3) -> Particle {
        Particle::new(
            ParticleInitParam::default()
                .with_life_time(10.0)
                .with_position(position)
                .with_velocity(Vec3::new(0.0, -1.0, 0.0), 1.0),
        )
    }

    #[test]
    fn test_builtin_names() {
        let registry = ModifierRegistry::with_builtins();
        for name in ["gravity", "wind", "drag", "attractor", "vortex", "ground"] {
            assert!(registry.create(name).is_some(), "{}", name);
        }
        assert!(registry.create("unknown").is_none());
        assert_eq!(
            registry.create("vortex").map(|m| m.kind()),
            Some(ModifierKind::Vortex)
        );
    }

    #[test]
    fn test_wind_translates() {
        let mut particles = vec![particle_at(Vec3::ZERO)];
        let mut wind = WindModifier {
            velocity: Vec3::new(2.0, 0.0, 0.0),
        };
        wind.apply(&mut particles, 0.5);
        assert!((particles[0].position() - Vec3::new(1.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_drag_scales_velocity() {
        let mut particles = vec![particle_at(Vec3::ZERO)];
        let mut drag = DragModifier { coefficient: 1.0 };
        drag.apply(&mut particles, 0.5);
        assert!((particles[0].velocity_scale() - 0.5).abs() < 0.001);

        particles[0].update(0.1);
        assert!((particles[0].velocity() - Vec3::new(0.0, -0.5, 0.0)).length() < 0.001);

        drag.apply(&mut particles, 10.0);
        assert_eq!(particles[0].velocity_scale(), 0.0);
    }

    #[test]
    fn test_drag_slows_speed_curve_particles() {
        let mut speed_curve = Curve::new();
        speed_curve.insert(0.0, 4.0f32, EasingId::Linear);
        speed_curve.insert(1.0, 4.0f32, EasingId::Linear);
        let mut param = ParticleInitParam::default()
            .with_life_time(10.0)
            .with_velocity(Vec3::X, 4.0);
        param.speed_curve = speed_curve;

        let mut free = vec![Particle::new(param.clone())];
        let mut dragged = vec![Particle::new(param)];
        let mut drag = DragModifier { coefficient: 1.0 };

        for _ in 0..5 {
            drag.apply(&mut dragged, 0.1);
            dragged[0].update(0.1);
            free[0].update(0.1);
        }

        // 曲线每帧重写速率，阻力仍然生效
        assert_eq!(dragged[0].speed(), 4.0);
        assert!(dragged[0].velocity().x < free[0].velocity().x * 0.7);
        assert!(dragged[0].position().x < free[0].position().x);
    }

    #[test]
    fn test_ground_collision_bounces() {
        let mut particles = vec![particle_at(Vec3::new(0.0, -0.5, 0.0))];
        let mut ground = GroundCollisionModifier {
            height: 0.0,
            restitution: 0.5,
        };
        ground.apply(&mut particles, 0.016);
        assert_eq!(particles[0].position().y, 0.0);
        assert!((particles[0].direction().y - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_vortex_preserves_radius() {
        let mut particles = vec![particle_at(Vec3::new(2.0, 1.0, 0.0))];
        let mut vortex = VortexModifier {
            center: Vec3::ZERO,
            axis: Vec3::Y,
            angular_speed: std::f32::consts::FRAC_PI_2,
        };
        vortex.apply(&mut particles, 1.0);
        let p = particles[0].position();
        assert!((p - Vec3::new(0.0, 1.0, -2.0)).length() < 0.001);
    }

    #[test]
    fn test_custom_registration() {
        struct Freeze;
        impl ParticleModifier for Freeze {
            fn apply(&mut self, particles: &mut [Particle], _dt: f32) {
                for p in particles {
                    p.set_speed(0.0);
                }
            }
        }

        let mut registry = ModifierRegistry::new();
        registry.register("freeze", || Freeze);
        let mut modifier = registry.create("freeze").unwrap();
        assert_eq!(modifier.kind(), ModifierKind::Custom);

        let mut particles = vec![particle_at(Vec3::ZERO)];
        modifier.apply(&mut particles, 0.1);
        assert_eq!(particles[0].speed(), 0.0);
    }
}
