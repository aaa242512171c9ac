//! 粒子系统
//!
//! 以粒子组为单位批处理：每组一个实例缓冲区环、一条管线、一次绘制。
//!
//! ## 帧流程
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ update(dt)                                               │
//! │   for group (名称序):                                     │
//! │     dt' = time_channels.delta(group.channel, dt)         │
//! │     modifiers → particle.update → 移除死亡粒子           │
//! │     写入 (world, color) → 当前实例缓冲区（截断到容量）   │
//! ├──────────────────────────────────────────────────────────┤
//! │ draw_particles()                                         │
//! │   root signature → for group with instances:             │
//! │     pipeline / VB / IB / camera CB / instances / texture │
//! │     DrawIndexedInstanced → instance_count = 0 → 环前进  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `update` 与 `draw_particles` 必须交替调用。

use bevy_ecs::prelude::*;
use glam::Vec3;
use std::collections::{BTreeMap, HashMap};

use super::group::{ParticleGroup, ParticleGroupKey};
use super::modifier::{ModifierFactory, ParticleModifier};
use super::particle::Particle;
use crate::config::ParticleConfig;
use crate::core::{ParticleError, ParticleResult, TimeChannels};
use crate::render::backend::{PipelineHandle, RenderCommand, RootSignatureHandle};
use crate::render::pipeline::{ParticleRenderSettings, PsoFlags};
use crate::render::resources::{ParticleCamera, RenderContext, TextureId};

/// 粒子系统统计信息
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleStats {
    /// 粒子组数
    pub groups: u32,
    /// 存活粒子数
    pub particles: u32,
    /// 本帧写入的实例数
    pub instances: u32,
    /// 本帧因容量截断的粒子数
    pub truncated: u32,
    /// 本帧移除的死亡粒子数
    pub removed: u32,
    /// 上次绘制的 Draw Call 数
    pub draw_calls: u32,
}

/// 粒子系统
#[derive(Resource)]
pub struct ParticleSystem {
    context: RenderContext,
    max_instances_per_group: u32,
    frames_in_flight: u32,
    default_time_channel: String,

    camera: Option<ParticleCamera>,
    groups: BTreeMap<String, ParticleGroup>,

    pipelines: HashMap<PsoFlags, PipelineHandle>,
    root_signature: Option<RootSignatureHandle>,

    modifier_factory: Option<Box<dyn ModifierFactory>>,
    modifiers: HashMap<String, Box<dyn ParticleModifier>>,

    time_channels: TimeChannels,
    stats: ParticleStats,
}

impl ParticleSystem {
    pub fn new(context: RenderContext, config: &ParticleConfig) -> Self {
        tracing::info!(
            target: "particles",
            backend = context.backend.name(),
            capacity = config.max_instances_per_group,
            frames_in_flight = config.frames_in_flight,
            "Particle system created"
        );

        Self {
            context,
            max_instances_per_group: config.max_instances_per_group.max(1),
            frames_in_flight: config.frames_in_flight.max(1),
            default_time_channel: config.default_time_channel.clone(),
            camera: None,
            groups: BTreeMap::new(),
            pipelines: HashMap::new(),
            root_signature: None,
            modifier_factory: None,
            modifiers: HashMap::new(),
            time_channels: TimeChannels::new(),
            stats: ParticleStats::default(),
        }
    }

    // ========================================================================
    // 外部协作者
    // ========================================================================

    pub fn set_camera(&mut self, camera: ParticleCamera) {
        self.camera = Some(camera);
    }

    /// 仅更新相机旋转（常量缓冲区不变）
    pub fn set_camera_rotation(&mut self, rotation: Vec3) -> ParticleResult<()> {
        let camera = self.camera.as_mut().ok_or(ParticleError::CameraNotSet)?;
        camera.rotation = rotation;
        Ok(())
    }

    pub fn camera(&self) -> Option<&ParticleCamera> {
        self.camera.as_ref()
    }

    pub fn set_modifier_factory(&mut self, factory: impl ModifierFactory + 'static) {
        self.modifier_factory = Some(Box::new(factory));
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    // ========================================================================
    // 添加粒子
    // ========================================================================

    /// 添加单个粒子
    pub fn add_particle<S: AsRef<str>>(
        &mut self,
        group_name: &str,
        model_name: &str,
        particle: Particle,
        settings: ParticleRenderSettings,
        texture: TextureId,
        modifiers: &[S],
    ) -> ParticleResult<()> {
        self.add_particles(group_name, model_name, vec![particle], settings, texture, modifiers)
    }

    /// 向粒子组追加粒子
    ///
    /// 首次使用时分配实例缓冲区并解析管线；之后的调用刷新纹理、模型与管线绑定。
    /// 所有解析（模型 / 管线 / 修改器）都在修改状态之前完成，失败时系统保持不变。
    pub fn add_particles<S: AsRef<str>>(
        &mut self,
        group_name: &str,
        model_name: &str,
        particles: Vec<Particle>,
        settings: ParticleRenderSettings,
        texture: TextureId,
        modifiers: &[S],
    ) -> ParticleResult<()> {
        let (needs_model, needs_pipeline) = match self.groups.get(group_name) {
            Some(group) => (
                group.key().model_name != model_name,
                group.key().settings != settings,
            ),
            None => (true, true),
        };

        let mesh = if needs_model {
            Some(
                self.context
                    .models
                    .find_model(model_name)
                    .ok_or_else(|| ParticleError::MissingModel(model_name.to_string()))?,
            )
        } else {
            None
        };

        let pipeline = if needs_pipeline {
            Some(self.resolve_pipeline(settings.particle_flags())?)
        } else {
            None
        };

        let created = self.create_modifiers(modifiers)?;
        for (name, modifier) in created {
            self.modifiers.insert(name, modifier);
        }

        if let Some(group) = self.groups.get_mut(group_name) {
            if let Some(mesh) = mesh {
                group.set_model(model_name, mesh);
            }
            if let Some(pipeline) = pipeline {
                group.set_pipeline(settings, pipeline);
            }
        } else if let (Some(mesh), Some(pipeline)) = (mesh, pipeline) {
            tracing::debug!(
                target: "particles",
                group = group_name,
                model = model_name,
                capacity = self.max_instances_per_group,
                "Particle group created"
            );
            let group = ParticleGroup::new(
                group_name,
                ParticleGroupKey {
                    model_name: model_name.to_string(),
                    settings,
                },
                mesh,
                pipeline,
                texture,
                self.max_instances_per_group,
                self.frames_in_flight,
                &self.default_time_channel,
                self.context.backend.as_ref(),
            );
            self.groups.insert(group_name.to_string(), group);
        }

        let group = self.group_mut(group_name)?;
        group.set_texture(texture);
        group.add_modifiers(modifiers);
        group.push_particles(particles);
        Ok(())
    }

    /// 解析并缓存管线
    fn resolve_pipeline(&mut self, flags: PsoFlags) -> ParticleResult<PipelineHandle> {
        if let Some(pipeline) = self.pipelines.get(&flags) {
            return Ok(*pipeline);
        }
        let pipeline = self
            .context
            .pipelines
            .pipeline_state(flags)
            .ok_or(ParticleError::PipelineUnavailable(flags.0))?;
        tracing::debug!(target: "particles", flags = flags.0, "Particle pipeline resolved");
        self.pipelines.insert(flags, pipeline);
        Ok(pipeline)
    }

    /// 创建尚未缓存的修改器
    fn create_modifiers<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> ParticleResult<Vec<(String, Box<dyn ParticleModifier>)>> {
        let mut created: Vec<(String, Box<dyn ParticleModifier>)> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.modifiers.contains_key(name) || created.iter().any(|(n, _)| n == name) {
                continue;
            }
            let factory = self
                .modifier_factory
                .as_ref()
                .ok_or(ParticleError::ModifierFactoryNotConfigured)?;
            let modifier = factory
                .create(name)
                .ok_or_else(|| ParticleError::UnknownModifier(name.to_string()))?;
            tracing::debug!(target: "particles", modifier = name, "Modifier created");
            created.push((name.to_string(), modifier));
        }
        Ok(created)
    }

    // ========================================================================
    // 帧更新与绘制
    // ========================================================================

    /// 更新所有粒子组并写入实例缓冲区
    pub fn update(&mut self, delta_time: f32) -> ParticleResult<()> {
        let has_particles = self.groups.values().any(|g| !g.is_empty());
        let mut stats = ParticleStats {
            groups: self.groups.len() as u32,
            draw_calls: self.stats.draw_calls,
            ..Default::default()
        };

        if !has_particles {
            self.stats = stats;
            return Ok(());
        }

        let camera = self.camera.ok_or(ParticleError::CameraNotSet)?;
        let backend = self.context.backend.as_ref();

        for group in self.groups.values_mut() {
            let dt = self.time_channels.delta(group.time_channel(), delta_time);
            let frame = group.update(dt, &camera, &mut self.modifiers, backend);
            stats.particles += frame.alive;
            stats.instances += frame.written;
            stats.truncated += frame.truncated;
            stats.removed += frame.removed;
        }

        self.stats = stats;
        Ok(())
    }

    /// 提交所有有实例的粒子组的绘制命令，返回 Draw Call 数
    ///
    /// 没有任何实例时不提交命令。
    pub fn draw_particles(&mut self) -> ParticleResult<u32> {
        let has_instances = self.groups.values().any(|g| g.instance_count() > 0);
        if !has_instances {
            self.stats.draw_calls = 0;
            return Ok(0);
        }

        let camera = self.camera.ok_or(ParticleError::CameraNotSet)?;
        let root_signature = self.resolve_root_signature()?;

        let mut commands = vec![RenderCommand::SetRootSignature { root_signature }];
        let mut draw_calls = 0;
        for group in self.groups.values_mut() {
            let descriptor = self.context.textures.gpu_handle(group.texture());
            if group.record_draw(&camera, descriptor, &mut commands) {
                draw_calls += 1;
            }
        }

        self.context.backend.submit(&commands);
        self.stats.draw_calls = draw_calls;
        Ok(draw_calls)
    }

    fn resolve_root_signature(&mut self) -> ParticleResult<RootSignatureHandle> {
        if let Some(root) = self.root_signature {
            return Ok(root);
        }
        let root = self
            .context
            .pipelines
            .root_signature(PsoFlags::TYPE_PARTICLE)
            .ok_or(ParticleError::PipelineUnavailable(PsoFlags::TYPE_PARTICLE.0))?;
        self.root_signature = Some(root);
        Ok(root)
    }

    // ========================================================================
    // 粒子组管理
    // ========================================================================

    /// 销毁所有粒子组并释放其实例缓冲区
    pub fn clear_particles(&mut self) {
        let names: Vec<String> = self.groups.keys().cloned().collect();
        for name in names {
            if let Err(e) = self.delete_group(&name) {
                tracing::warn!(target: "particles", group = %name, error = %e, "Failed to delete group");
            }
        }
    }

    /// 清空单个粒子组的粒子（保留粒子组与缓冲区）
    pub fn clear_group(&mut self, name: &str) -> ParticleResult<()> {
        self.group_mut(name)?.clear_particles();
        Ok(())
    }

    /// 删除粒子组并释放其实例缓冲区
    pub fn delete_group(&mut self, name: &str) -> ParticleResult<()> {
        let mut group = self
            .groups
            .remove(name)
            .ok_or_else(|| ParticleError::GroupNotFound(name.to_string()))?;
        group.release(self.context.backend.as_ref());
        tracing::debug!(target: "particles", group = name, "Particle group deleted");
        Ok(())
    }

    pub fn set_group_texture(&mut self, name: &str, texture: TextureId) -> ParticleResult<()> {
        self.group_mut(name)?.set_texture(texture);
        Ok(())
    }

    pub fn remove_group_modifier(&mut self, group: &str, modifier: &str) -> ParticleResult<bool> {
        Ok(self.group_mut(group)?.remove_modifier(modifier))
    }

    pub fn group(&self, name: &str) -> Option<&ParticleGroup> {
        self.groups.get(name)
    }

    fn group_mut(&mut self, name: &str) -> ParticleResult<&mut ParticleGroup> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| ParticleError::GroupNotFound(name.to_string()))
    }

    pub fn groups(&self) -> impl Iterator<Item = &ParticleGroup> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn particle_count(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn stats(&self) -> ParticleStats {
        self.stats
    }

    // ========================================================================
    // 时间通道
    // ========================================================================

    pub fn time_channels(&self) -> &TimeChannels {
        &self.time_channels
    }

    pub fn set_time_scale(&mut self, channel: &str, scale: f32) {
        self.time_channels.set_scale(channel, scale);
    }

    pub fn set_group_time_channel(&mut self, group: &str, channel: &str) -> ParticleResult<()> {
        self.group_mut(group)?.set_time_channel(channel);
        Ok(())
    }

    pub fn set_all_time_channels(&mut self, channel: &str) {
        for group in self.groups.values_mut() {
            group.set_time_channel(channel);
        }
    }
}
