//! 粒子组（批处理单元）
//!
//! 一个粒子组对应一次实例化绘制：相同模型 + 相同渲染设置。
//!
//! ## 实例缓冲区环
//!
//! ```text
//! frame N   update → 写入 buffers[i]      draw → 绑定 buffers[i]，i = (i+1) % n
//! frame N+1 update → 写入 buffers[i+1]    （GPU 仍可能在读 buffers[i]）
//! ```
//!
//! 每个缓冲区容量固定为 `capacity` 个实例，从不扩容；超出部分本帧不绘制。

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::HashMap;

use super::modifier::ParticleModifier;
use super::particle::Particle;
use crate::core::utils::{euler_to_quat, gated_euler};
use crate::render::backend::{
    BufferDescriptor, BufferHandle, BufferUsage, GpuBackend, PipelineHandle, RenderCommand,
};
use crate::render::pipeline::{ParticleRenderSettings, PsoFlags};
use crate::render::resources::{MeshInfo, ParticleCamera, TextureId};

/// GPU 实例数据（与着色器结构化缓冲区布局一致）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub world: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ParticleInstance {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

/// 粒子组键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticleGroupKey {
    pub model_name: String,
    pub settings: ParticleRenderSettings,
}

/// 单帧更新结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFrameStats {
    /// 存活粒子数
    pub alive: u32,
    /// 本帧死亡并移除的粒子数
    pub removed: u32,
    /// 写入实例缓冲区的实例数
    pub written: u32,
    /// 因容量不足未写入的粒子数
    pub truncated: u32,
}

/// 粒子组
pub struct ParticleGroup {
    name: String,
    key: ParticleGroupKey,
    mesh: MeshInfo,
    pipeline: PipelineHandle,
    pso_flags: PsoFlags,
    texture: TextureId,

    particles: Vec<Particle>,
    modifiers: Vec<String>,
    time_channel: String,

    capacity: u32,
    instance_buffers: Vec<BufferHandle>,
    frame_index: usize,
    staging: Vec<ParticleInstance>,
    instance_count: u32,
}

impl ParticleGroup {
    /// 创建粒子组并分配 `frames_in_flight` 个实例缓冲区
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: &str,
        key: ParticleGroupKey,
        mesh: MeshInfo,
        pipeline: PipelineHandle,
        texture: TextureId,
        capacity: u32,
        frames_in_flight: u32,
        time_channel: &str,
        backend: &dyn GpuBackend,
    ) -> Self {
        let instance_buffers = (0..frames_in_flight.max(1))
            .map(|i| {
                backend.create_buffer(&BufferDescriptor {
                    label: Some(format!("{} Instance Buffer {}", name, i)),
                    size: ParticleInstance::SIZE * capacity as u64,
                    usage: BufferUsage::STORAGE | BufferUsage::COPY_DST,
                })
            })
            .collect();

        let pso_flags = key.settings.particle_flags();

        Self {
            name: name.to_string(),
            key,
            mesh,
            pipeline,
            pso_flags,
            texture,
            particles: Vec::new(),
            modifiers: Vec::new(),
            time_channel: time_channel.to_string(),
            capacity,
            instance_buffers,
            frame_index: 0,
            staging: Vec::with_capacity(capacity as usize),
            instance_count: 0,
        }
    }

    // ========================================================================
    // 粒子与修改器
    // ========================================================================

    pub fn push_particles(&mut self, particles: impl IntoIterator<Item = Particle>) {
        self.particles.extend(particles);
    }

    /// 追加修改器名（保持首次出现顺序，去重）
    pub fn add_modifiers<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            let name = name.as_ref();
            if !self.modifiers.iter().any(|m| m == name) {
                self.modifiers.push(name.to_string());
            }
        }
    }

    pub fn remove_modifier(&mut self, name: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m != name);
        before != self.modifiers.len()
    }

    pub fn clear_particles(&mut self) {
        self.particles.clear();
        self.instance_count = 0;
    }

    // ========================================================================
    // 帧更新
    // ========================================================================

    /// 公告板欧拉角：按首个粒子的轴开关门控相机旋转
    pub fn billboard_rotation(&self, camera_rotation: Vec3) -> Vec3 {
        match self.particles.first() {
            Some(p) => gated_euler(camera_rotation, p.billboard()),
            None => Vec3::ZERO,
        }
    }

    /// 修改器 → 粒子更新 → 写实例
    ///
    /// `modifiers` 为系统级缓存，组内引用的名称必须已解析。
    pub(crate) fn update(
        &mut self,
        delta_time: f32,
        camera: &ParticleCamera,
        modifiers: &mut HashMap<String, Box<dyn ParticleModifier>>,
        backend: &dyn GpuBackend,
    ) -> GroupFrameStats {
        let mut stats = GroupFrameStats::default();
        self.instance_count = 0;
        self.staging.clear();

        if self.particles.is_empty() {
            return stats;
        }

        for name in &self.modifiers {
            match modifiers.get_mut(name) {
                Some(modifier) => modifier.apply(&mut self.particles, delta_time),
                None => {
                    tracing::warn!(target: "particles", group = %self.name, modifier = %name, "Modifier not resolved");
                }
            }
        }

        let billboard = Mat4::from_quat(euler_to_quat(self.billboard_rotation(camera.rotation)));

        let before = self.particles.len();
        self.particles.retain_mut(|p| {
            p.update(delta_time);
            p.is_alive()
        });
        stats.removed = (before - self.particles.len()) as u32;
        stats.alive = self.particles.len() as u32;

        let capacity = self.capacity as usize;
        for particle in self.particles.iter().take(capacity) {
            self.staging.push(ParticleInstance {
                world: particle.world_matrix(billboard).to_cols_array_2d(),
                color: particle.color().to_array(),
            });
        }
        self.instance_count = self.staging.len() as u32;
        stats.written = self.instance_count;
        stats.truncated = stats.alive - stats.written;

        if stats.truncated > 0 {
            tracing::debug!(
                target: "particles",
                group = %self.name,
                capacity = self.capacity,
                dropped = stats.truncated,
                "Instance buffer full, truncating"
            );
        }

        if self.instance_count > 0 {
            backend.write_buffer(
                self.current_instance_buffer(),
                0,
                bytemuck::cast_slice(&self.staging),
            );
        }

        stats
    }

    /// 录制本组的绘制命令并推进缓冲区环
    ///
    /// 实例数为 0 时不录制任何命令。
    pub(crate) fn record_draw(
        &mut self,
        camera: &ParticleCamera,
        texture_descriptor: crate::render::backend::DescriptorHandle,
        commands: &mut Vec<RenderCommand>,
    ) -> bool {
        if self.instance_count == 0 {
            return false;
        }

        commands.push(RenderCommand::SetPipeline {
            pipeline: self.pipeline,
        });
        commands.push(RenderCommand::SetVertexBuffer {
            slot: 0,
            buffer: self.mesh.vertex_buffer,
        });
        commands.push(RenderCommand::SetIndexBuffer {
            buffer: self.mesh.index_buffer,
            format: self.mesh.index_format,
        });
        commands.push(RenderCommand::SetConstantBuffer {
            slot: 0,
            buffer: camera.constant_buffer,
        });
        commands.push(RenderCommand::SetInstanceBuffer {
            slot: 1,
            buffer: self.current_instance_buffer(),
        });
        commands.push(RenderCommand::SetTexture {
            slot: 2,
            descriptor: texture_descriptor,
        });
        commands.push(RenderCommand::DrawIndexedInstanced {
            index_count: self.mesh.index_count,
            instance_count: self.instance_count,
        });

        self.instance_count = 0;
        self.frame_index = (self.frame_index + 1) % self.instance_buffers.len();
        true
    }

    /// 更换渲染设置与管线
    pub(crate) fn set_pipeline(&mut self, settings: ParticleRenderSettings, pipeline: PipelineHandle) {
        self.key.settings = settings;
        self.pso_flags = settings.particle_flags();
        self.pipeline = pipeline;
    }

    /// 更换模型网格
    pub(crate) fn set_model(&mut self, model_name: &str, mesh: MeshInfo) {
        self.key.model_name = model_name.to_string();
        self.mesh = mesh;
    }

    pub(crate) fn release(&mut self, backend: &dyn GpuBackend) {
        for buffer in self.instance_buffers.drain(..) {
            backend.destroy_buffer(buffer);
        }
        self.particles.clear();
        self.staging.clear();
        self.instance_count = 0;
    }

    // ========================================================================
    // 访问器
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &ParticleGroupKey {
        &self.key
    }

    pub fn mesh(&self) -> &MeshInfo {
        &self.mesh
    }

    pub fn pipeline(&self) -> PipelineHandle {
        self.pipeline
    }

    pub fn pso_flags(&self) -> PsoFlags {
        self.pso_flags
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn set_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    pub fn time_channel(&self) -> &str {
        &self.time_channel
    }

    pub fn set_time_channel(&mut self, channel: &str) {
        self.time_channel = channel.to_string();
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// 本帧写入的实例数据
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.staging[..self.instance_count as usize]
    }

    pub fn instance_buffers(&self) -> &[BufferHandle] {
        &self.instance_buffers
    }

    /// 当前帧写入 / 绑定的实例缓冲区
    pub fn current_instance_buffer(&self) -> BufferHandle {
        self.instance_buffers[self.frame_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::{DescriptorHandle, IndexFormat, RecordingBackend};
    use crate::render::particles::ParticleInitParam;

    fn test_group(backend: &RecordingBackend, capacity: u32, frames: u32) -> ParticleGroup {
        ParticleGroup::new(
            "sparks",
            ParticleGroupKey {
                model_name: "plane/plane.gltf".to_string(),
                settings: ParticleRenderSettings::default(),
            },
            MeshInfo {
                vertex_buffer: BufferHandle(900),
                index_buffer: BufferHandle(901),
                index_format: IndexFormat::Uint32,
                index_count: 6,
            },
            PipelineHandle(7),
            TextureId(0),
            capacity,
            frames,
            "default",
            backend,
        )
    }

    fn camera() -> ParticleCamera {
        ParticleCamera::new(Vec3::ZERO, BufferHandle(500))
    }

    fn live_particles(n: usize) -> Vec<Particle> {
        (0..n)
            .map(|i| {
                Particle::new(
                    ParticleInitParam::default()
                        .with_life_time(10.0)
                        .with_position(Vec3::new(i as f32, 0.0, 0.0)),
                )
            })
            .collect()
    }

    #[test]
    fn test_instance_size() {
        assert_eq!(ParticleInstance::SIZE, 80);
    }

    #[test]
    fn test_truncation_keeps_first_particles() {
        let backend = RecordingBackend::new();
        let mut group = test_group(&backend, 4, 2);
        group.push_particles(live_particles(6));

        let stats = group.update(0.016, &camera(), &mut HashMap::new(), &backend);
        assert_eq!(stats.alive, 6);
        assert_eq!(stats.written, 4);
        assert_eq!(stats.truncated, 2);
        // 迭代顺序靠前的粒子优先
        assert_eq!(group.instances()[3].world[3][0], 3.0);
    }

    #[test]
    fn test_modifier_names_dedup_in_order() {
        let backend = RecordingBackend::new();
        let mut group = test_group(&backend, 4, 1);
        group.add_modifiers(&["wind", "drag"]);
        group.add_modifiers(&["drag", "gravity", "wind"]);
        assert_eq!(group.modifiers(), &["wind", "drag", "gravity"]);
    }

    #[test]
    fn test_ring_rotates_on_draw() {
        let backend = RecordingBackend::new();
        let mut group = test_group(&backend, 4, 2);
        assert_eq!(group.instance_buffers().len(), 2);
        group.push_particles(live_particles(1));

        let first = group.current_instance_buffer();
        group.update(0.016, &camera(), &mut HashMap::new(), &backend);
        let mut commands = Vec::new();
        assert!(group.record_draw(&camera(), DescriptorHandle(1), &mut commands));
        assert!(commands.contains(&RenderCommand::SetInstanceBuffer {
            slot: 1,
            buffer: first
        }));

        let second = group.current_instance_buffer();
        assert_ne!(first, second);

        // 未 update 的第二次绘制不录制命令
        let mut commands = Vec::new();
        assert!(!group.record_draw(&camera(), DescriptorHandle(1), &mut commands));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_billboard_gated_by_first_particle() {
        let backend = RecordingBackend::new();
        let mut group = test_group(&backend, 4, 1);
        let particle = Particle::new(
            ParticleInitParam::default()
                .with_life_time(10.0)
                .with_billboard([true, false, false]),
        );
        group.push_particles([particle]);

        let cam = Vec3::new(0.4, 1.1, -0.3);
        assert_eq!(group.billboard_rotation(cam), Vec3::new(0.4, 0.0, 0.0));
    }

    #[test]
    fn test_release_destroys_buffers() {
        let backend = RecordingBackend::new();
        let mut group = test_group(&backend, 4, 3);
        assert_eq!(backend.recording().buffers.len(), 3);
        group.release(&backend);
        assert!(backend.recording().buffers.is_empty());
    }
}
