pub mod backend;
pub mod particles;
pub mod pipeline;
pub mod resources;
pub mod wgpu_backend;

// Re-export backend abstraction
pub use backend::{
    BufferDescriptor, BufferHandle, BufferUsage, DescriptorHandle, GpuBackend, IndexFormat,
    PipelineHandle, RecordingBackend, RenderCommand, RootSignatureHandle,
};

// Re-export pipeline flags and cache
pub use pipeline::{BlendMode, ParticleRenderSettings, PipelineCache, PsoFlags, StaticPipelineCache};

// Re-export injected resources
pub use resources::{
    MeshInfo, ModelProvider, ModelRegistry, ParticleCamera, RenderContext, TextureId,
    TextureProvider, TextureRegistry,
};

// Re-export wgpu backend
pub use wgpu_backend::{WgpuBackend, WgpuFrame};
