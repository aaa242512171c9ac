use bevy_ecs::prelude::*;

use crate::render::particles::{ParticleEmitter, ParticleSystem};

#[derive(Resource)]
pub struct Time {
    pub delta_seconds: f32,
    pub elapsed_seconds: f64,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            delta_seconds: 0.0,
            elapsed_seconds: 0.0,
        }
    }
}

impl Time {
    pub fn advance(&mut self, delta_seconds: f32) {
        self.delta_seconds = delta_seconds;
        self.elapsed_seconds += delta_seconds as f64;
    }
}

/// 推进所有发射器，把新粒子交给粒子系统
pub fn particle_emitter_system(
    mut emitters: Query<&mut ParticleEmitter>,
    system: Option<ResMut<ParticleSystem>>,
    time: Res<Time>,
) {
    let Some(mut system) = system else { return };
    for mut emitter in emitters.iter_mut() {
        if let Err(e) = emitter.update(time.delta_seconds, &mut system) {
            tracing::error!(target: "particles", emitter = emitter.name(), error = %e, "Emitter update failed");
        }
    }
}

/// 模拟所有粒子组并写入实例缓冲区
pub fn particle_update_system(system: Option<ResMut<ParticleSystem>>, time: Res<Time>) {
    let Some(mut system) = system else { return };
    if let Err(e) = system.update(time.delta_seconds) {
        tracing::error!(target: "particles", error = %e, "Particle update failed");
    }
}

/// 提交粒子绘制命令
pub fn particle_draw_system(system: Option<ResMut<ParticleSystem>>) {
    let Some(mut system) = system else { return };
    if let Err(e) = system.draw_particles() {
        tracing::error!(target: "particles", error = %e, "Particle draw failed");
    }
}

/// 移除已结束的非循环发射器
pub fn despawn_finished_emitters(mut commands: Commands, emitters: Query<(Entity, &ParticleEmitter)>) {
    for (entity, emitter) in emitters.iter() {
        if !emitter.is_alive() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleConfig;
    use crate::render::particles::EmitterSettings;
    use crate::render::{
        BufferHandle, IndexFormat, MeshInfo, ModelRegistry, ParticleCamera, RecordingBackend,
        RenderContext, StaticPipelineCache, TextureRegistry,
    };
    use glam::Vec3;
    use std::sync::Arc;

    fn world_with_system() -> (World, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::new());
        let models = ModelRegistry::new().with_model(
            "plane/plane.gltf",
            MeshInfo {
                vertex_buffer: BufferHandle(900),
                index_buffer: BufferHandle(901),
                index_format: IndexFormat::Uint32,
                index_count: 6,
            },
        );
        let context = RenderContext::new(
            backend.clone(),
            Arc::new(StaticPipelineCache::with_all_particle_pipelines(1)),
            Arc::new(models),
            Arc::new(TextureRegistry::new(100)),
        );
        let mut system = ParticleSystem::new(context, &ParticleConfig::default());
        system.set_camera(ParticleCamera::new(Vec3::ZERO, BufferHandle(500)));

        let mut world = World::new();
        world.insert_resource(system);
        world.insert_resource(Time::default());
        (world, backend)
    }

    fn frame_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                particle_emitter_system,
                particle_update_system,
                particle_draw_system,
                despawn_finished_emitters,
            )
                .chain(),
        );
        schedule
    }

    #[test]
    fn test_time_advance() {
        let mut time = Time::default();
        time.advance(0.5);
        time.advance(0.25);
        assert_eq!(time.delta_seconds, 0.25);
        assert!((time.elapsed_seconds - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_schedule_emits_and_draws() {
        let (mut world, backend) = world_with_system();
        world.spawn(ParticleEmitter::with_seed(
            EmitterSettings {
                name: "sparks".to_string(),
                emit_per_sec: 10,
                count_per_emit: 4,
                ..Default::default()
            },
            1,
        ));
        world.resource_mut::<Time>().advance(0.1);

        let mut schedule = frame_schedule();
        schedule.run(&mut world);

        assert_eq!(world.resource::<ParticleSystem>().particle_count(), 4);
        assert_eq!(backend.recording().draw_calls(), vec![(6, 4)]);
    }

    #[test]
    fn test_finished_emitter_despawned() {
        let (mut world, _) = world_with_system();
        world.spawn(ParticleEmitter::with_seed(
            EmitterSettings {
                emit_per_sec: 10,
                emit_repeat_count: 1,
                looping: false,
                ..Default::default()
            },
            1,
        ));
        world.resource_mut::<Time>().advance(0.1);

        let mut schedule = frame_schedule();
        schedule.run(&mut world);

        let mut query = world.query::<&ParticleEmitter>();
        assert_eq!(query.iter(&world).count(), 0);
    }
}
