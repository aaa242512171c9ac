//! # Particle Engine
//!
//! GPU-resident particle animation built with Rust.
//!
//! ## Features
//!
//! - **Easing**: 33 easing curves addressable by enum or integer index
//! - **Keyframe Curves**: Typed, always-sorted keyframe curves with per-key easing
//! - **Parameter Tracks**: Runtime-typed tracks over `i32`/`f32`/`Vec2`/`Vec3`/`Vec4`/`Quat`
//! - **Particles**: Curve-driven particles with emitters and a modifier pipeline
//! - **Instanced Batching**: One instanced draw call per (model, render settings) group
//!
//! ## Architecture Design
//!
//! The GPU device, pipeline cache, model store and texture store are injected
//! into [`render::particles::ParticleSystem`] through a [`render::RenderContext`];
//! the caller owns the composition root.
//!
//! ### Example
//!
//! ```ignore
//! use particle_engine::render::particles::{ParticleSystem, ParticleEmitter};
//!
//! let mut system = ParticleSystem::new(context, &config.particles);
//! system.set_camera(camera);
//! emitter.update(dt, &mut system)?;
//! system.update(dt)?;
//! system.draw_particles()?;
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging, macros and time channels
//! - [`config`]: TOML/JSON configuration
//! - [`animation`]: Easing, keyframe curves, parameter tracks and sequences
//! - [`render`]: GPU backend abstraction and the particle system
//! - [`ecs`]: bevy_ecs integration

/// Errors, logging, macros and time channels
#[macro_use]
pub mod core;
/// Configuration loading and validation
pub mod config;
/// Keyframe animation primitives
pub mod animation;
/// GPU abstraction and particle batching
pub mod render;
/// ECS components, resources and systems
pub mod ecs;

pub use animation::{
    AnimationSequence, Curve, EasingId, Interpolate, Keyframe, ParameterTrack, ParameterValue,
    ValueKind,
};
pub use config::{EngineConfig, LoggingConfig, ParticleConfig};
pub use crate::core::{AnimationError, EngineError, EngineResult, ParticleError, ParticleResult};
pub use render::particles::{
    Particle, ParticleEmitter, ParticleGroup, ParticleInitParam, ParticleModifier, ParticleSystem,
};
