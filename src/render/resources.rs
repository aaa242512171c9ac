//! 粒子渲染所需的外部资源接口
//!
//! 模型仓库、纹理仓库、相机，以及把它们与设备、管线缓存
//! 捆绑在一起注入粒子系统的 `RenderContext`。

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::backend::{BufferHandle, DescriptorHandle, GpuBackend, IndexFormat};
use super::pipeline::PipelineCache;

/// 网格信息（顶点 / 索引缓冲区）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshInfo {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_format: IndexFormat,
    pub index_count: u32,
}

/// 纹理标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// 模型仓库
pub trait ModelProvider: Send + Sync {
    fn find_model(&self, name: &str) -> Option<MeshInfo>;
}

/// 纹理仓库
pub trait TextureProvider: Send + Sync {
    /// 纹理的着色器可见描述符
    fn gpu_handle(&self, texture: TextureId) -> DescriptorHandle;

    /// 按名称查找已加载的纹理
    fn find_texture(&self, _name: &str) -> Option<TextureId> {
        None
    }
}

/// 粒子相机
///
/// 只需要欧拉旋转（用于公告板）与常量缓冲区句柄。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleCamera {
    pub rotation: Vec3,
    pub constant_buffer: BufferHandle,
}

impl ParticleCamera {
    pub fn new(rotation: Vec3, constant_buffer: BufferHandle) -> Self {
        Self {
            rotation,
            constant_buffer,
        }
    }
}

/// 注入粒子系统的外部协作者
#[derive(Clone)]
pub struct RenderContext {
    pub backend: Arc<dyn GpuBackend>,
    pub pipelines: Arc<dyn PipelineCache>,
    pub models: Arc<dyn ModelProvider>,
    pub textures: Arc<dyn TextureProvider>,
}

impl RenderContext {
    pub fn new(
        backend: Arc<dyn GpuBackend>,
        pipelines: Arc<dyn PipelineCache>,
        models: Arc<dyn ModelProvider>,
        textures: Arc<dyn TextureProvider>,
    ) -> Self {
        Self {
            backend,
            pipelines,
            models,
            textures,
        }
    }
}

/// 内存模型表
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: HashMap<String, MeshInfo>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, mesh: MeshInfo) {
        self.models.insert(name.into(), mesh);
    }

    pub fn with_model(mut self, name: impl Into<String>, mesh: MeshInfo) -> Self {
        self.insert(name, mesh);
        self
    }
}

impl ModelProvider for ModelRegistry {
    fn find_model(&self, name: &str) -> Option<MeshInfo> {
        self.models.get(name).copied()
    }
}

/// 内存纹理表
///
/// 描述符句柄直接取纹理 ID 加上基址偏移。
#[derive(Debug, Default, Clone)]
pub struct TextureRegistry {
    base: u64,
    names: HashMap<String, TextureId>,
}

impl TextureRegistry {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            names: HashMap::new(),
        }
    }

    /// 登记纹理名，返回分配的 ID
    pub fn register(&mut self, name: impl Into<String>) -> TextureId {
        let next = TextureId(self.names.len() as u32);
        *self.names.entry(name.into()).or_insert(next)
    }
}

impl TextureProvider for TextureRegistry {
    fn gpu_handle(&self, texture: TextureId) -> DescriptorHandle {
        DescriptorHandle(self.base + texture.0 as u64)
    }

    fn find_texture(&self, name: &str) -> Option<TextureId> {
        self.names.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_registry() {
        let mesh = MeshInfo {
            vertex_buffer: BufferHandle(1),
            index_buffer: BufferHandle(2),
            index_format: IndexFormat::Uint32,
            index_count: 6,
        };
        let registry = ModelRegistry::new().with_model("plane/plane.gltf", mesh);
        assert_eq!(registry.find_model("plane/plane.gltf"), Some(mesh));
        assert!(registry.find_model("cube/cube.obj").is_none());
    }

    #[test]
    fn test_texture_registry() {
        let mut textures = TextureRegistry::new(1000);
        let a = textures.register("circle.png");
        let b = textures.register("spark.png");
        assert_eq!(textures.register("circle.png"), a);
        assert_ne!(a, b);
        assert_eq!(textures.gpu_handle(b), DescriptorHandle(1001));
        assert_eq!(textures.find_texture("spark.png"), Some(b));
    }
}
