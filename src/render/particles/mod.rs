//! 粒子系统模块
//!
//! CPU 模拟、GPU 实例化绘制的粒子系统。
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Particle Pipeline                     │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Emission (ParticleEmitter)                           │
//! │     - 按节奏生成 ParticleInitParam                        │
//! │     - 交给同名粒子组                                      │
//! │                                                          │
//! │  2. Simulation (ParticleGroup::update)                   │
//! │     - 修改器管线（重力、风、阻力……）                     │
//! │     - 曲线求值、位置积分、寿命                            │
//! │     - 写入 (world, color) 实例数据                        │
//! │                                                          │
//! │  3. Rendering (ParticleSystem::draw_particles)           │
//! │     - 每组一次 DrawIndexedInstanced                       │
//! │     - 公告板旋转由相机欧拉角按轴门控                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut system = ParticleSystem::new(context, &config.particles);
//! system.set_camera(ParticleCamera::new(camera_rotation, camera_cb));
//! system.set_modifier_factory(ModifierRegistry::with_builtins());
//!
//! let mut emitter = ParticleEmitter::new(EmitterSettings {
//!     name: "sparks".to_string(),
//!     modifiers: vec!["gravity".to_string()],
//!     ..Default::default()
//! });
//!
//! emitter.update(dt, &mut system)?;
//! system.update(dt)?;
//! system.draw_particles()?;
//! ```

pub mod emitter;
pub mod group;
pub mod init_param;
pub mod modifier;
pub mod particle;
pub mod system;

pub use emitter::{
    EmitterSettings, EmitterShape, LifeTimePolicy, ParticleDirection, ParticleEmitter,
    RandomRange, SettingGroup,
};
pub use group::{GroupFrameStats, ParticleGroup, ParticleGroupKey, ParticleInstance};
pub use init_param::ParticleInitParam;
pub use modifier::{
    AttractorModifier, DragModifier, GravityModifier, GroundCollisionModifier, ModifierFactory,
    ModifierKind, ModifierRegistry, ParticleModifier, VortexModifier, WindModifier,
};
pub use particle::Particle;
pub use system::{ParticleStats, ParticleSystem};
