//! 基于 wgpu 的 `GpuBackend` 实现
//!
//! 缓冲区写入直接走 `Queue::write_buffer`，在下一次 `queue.submit` 时生效。
//! `submit` 不直接编码：命令被解析为持有资源引用的 `WgpuFrame`，
//! 由调用方在自己的渲染通道中回放。
//!
//! ## 绑定约定
//!
//! | 命令                         | wgpu                                |
//! |------------------------------|-------------------------------------|
//! | `SetVertexBuffer { slot }`   | `set_vertex_buffer(slot, ..)`       |
//! | `SetConstantBuffer { slot }` | `set_bind_group(slot, ..)`          |
//! | `SetInstanceBuffer { slot }` | `set_bind_group(slot, ..)`          |
//! | `SetTexture { slot }`        | `set_bind_group(slot, ..)`          |
//! | `SetRootSignature`           | 无（布局包含在管线中）              |

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::backend::{
    BufferDescriptor, BufferHandle, BufferUsage, DescriptorHandle, GpuBackend, IndexFormat,
    PipelineHandle, RenderCommand,
};

/// 把抽象用途映射为 wgpu 用途
pub fn to_wgpu_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    let mut out = wgpu::BufferUsages::empty();
    let table = [
        (BufferUsage::VERTEX, wgpu::BufferUsages::VERTEX),
        (BufferUsage::INDEX, wgpu::BufferUsages::INDEX),
        (BufferUsage::UNIFORM, wgpu::BufferUsages::UNIFORM),
        (BufferUsage::STORAGE, wgpu::BufferUsages::STORAGE),
        (BufferUsage::COPY_SRC, wgpu::BufferUsages::COPY_SRC),
        (BufferUsage::COPY_DST, wgpu::BufferUsages::COPY_DST),
    ];
    for (ours, theirs) in table {
        if usage.contains(ours) {
            out |= theirs;
        }
    }
    out
}

pub fn to_wgpu_index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
        IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
    }
}

/// 解析后的绘制命令
enum FrameCommand {
    Pipeline(Arc<wgpu::RenderPipeline>),
    VertexBuffer(u32, Arc<wgpu::Buffer>),
    IndexBuffer(Arc<wgpu::Buffer>, wgpu::IndexFormat),
    BindGroup(u32, Arc<wgpu::BindGroup>),
    Draw { index_count: u32, instance_count: u32 },
}

/// 一帧待回放的命令
#[derive(Default)]
pub struct WgpuFrame {
    commands: Vec<FrameCommand>,
}

impl WgpuFrame {
    /// 在渲染通道中回放
    pub fn encode<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        for command in &self.commands {
            match command {
                FrameCommand::Pipeline(pipeline) => pass.set_pipeline(pipeline),
                FrameCommand::VertexBuffer(slot, buffer) => {
                    pass.set_vertex_buffer(*slot, buffer.slice(..))
                }
                FrameCommand::IndexBuffer(buffer, format) => {
                    pass.set_index_buffer(buffer.slice(..), *format)
                }
                FrameCommand::BindGroup(index, group) => pass.set_bind_group(*index, group, &[]),
                FrameCommand::Draw {
                    index_count,
                    instance_count,
                } => pass.draw_indexed(0..*index_count, 0, 0..*instance_count),
            }
        }
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, FrameCommand::Draw { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Default)]
struct Resources {
    buffers: HashMap<BufferHandle, Arc<wgpu::Buffer>>,
    /// 以缓冲区为资源的绑定组（常量缓冲区 / 实例缓冲区）
    buffer_bind_groups: HashMap<BufferHandle, Arc<wgpu::BindGroup>>,
    pipelines: HashMap<PipelineHandle, Arc<wgpu::RenderPipeline>>,
    descriptors: HashMap<DescriptorHandle, Arc<wgpu::BindGroup>>,
    pending: Vec<FrameCommand>,
}

/// wgpu 后端
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    /// 存储缓冲区自动绑定组布局（binding 0 = 整个缓冲区）
    storage_layout: Option<Arc<wgpu::BindGroupLayout>>,
    next_id: AtomicU64,
    resources: Mutex<Resources>,
}

impl WgpuBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            storage_layout: None,
            next_id: AtomicU64::new(1),
            resources: Mutex::new(Resources::default()),
        }
    }

    /// 设置后，创建的存储缓冲区自动生成绑定组，可直接作为实例缓冲区绑定
    pub fn with_storage_layout(mut self, layout: Arc<wgpu::BindGroupLayout>) -> Self {
        self.storage_layout = Some(layout);
        self
    }

    /// 只读存储缓冲区的绑定组布局（顶点着色器可见）
    pub fn create_storage_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Instance Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn resources(&self) -> MutexGuard<'_, Resources> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_handle(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// 登记外部创建的缓冲区（模型顶点 / 索引缓冲区等）
    pub fn register_buffer(&self, buffer: Arc<wgpu::Buffer>) -> BufferHandle {
        let handle = BufferHandle(self.next_handle());
        self.resources().buffers.insert(handle, buffer);
        handle
    }

    /// 为缓冲区登记绑定组（如相机常量缓冲区）
    pub fn register_buffer_bind_group(&self, buffer: BufferHandle, bind_group: Arc<wgpu::BindGroup>) {
        self.resources().buffer_bind_groups.insert(buffer, bind_group);
    }

    pub fn register_pipeline(&self, pipeline: Arc<wgpu::RenderPipeline>) -> PipelineHandle {
        let handle = PipelineHandle(self.next_handle());
        self.resources().pipelines.insert(handle, pipeline);
        handle
    }

    /// 登记纹理绑定组，返回描述符句柄
    pub fn register_descriptor(&self, bind_group: Arc<wgpu::BindGroup>) -> DescriptorHandle {
        let handle = DescriptorHandle(self.next_handle());
        self.resources().descriptors.insert(handle, bind_group);
        handle
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<Arc<wgpu::Buffer>> {
        self.resources().buffers.get(&handle).cloned()
    }

    /// 取出自上次调用以来提交的全部命令
    pub fn take_frame(&self) -> WgpuFrame {
        WgpuFrame {
            commands: std::mem::take(&mut self.resources().pending),
        }
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}

impl GpuBackend for WgpuBackend {
    fn create_buffer(&self, desc: &BufferDescriptor) -> BufferHandle {
        let buffer = Arc::new(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label.as_deref(),
            size: desc.size.max(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: to_wgpu_usage(desc.usage),
            mapped_at_creation: false,
        }));

        let bind_group = match (&self.storage_layout, desc.usage.contains(BufferUsage::STORAGE)) {
            (Some(layout), true) => Some(Arc::new(self.device.create_bind_group(
                &wgpu::BindGroupDescriptor {
                    label: desc.label.as_deref(),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                },
            ))),
            _ => None,
        };

        let handle = BufferHandle(self.next_handle());
        let mut resources = self.resources();
        resources.buffers.insert(handle, buffer);
        if let Some(bind_group) = bind_group {
            resources.buffer_bind_groups.insert(handle, bind_group);
        }
        handle
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut resources = self.resources();
        resources.buffer_bind_groups.remove(&buffer);
        if let Some(buffer) = resources.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let Some(target) = self.buffer(buffer) else {
            tracing::warn!(target: "render", buffer = buffer.0, "write to unknown buffer");
            return;
        };
        self.queue.write_buffer(&target, offset, data);
    }

    fn submit(&self, commands: &[RenderCommand]) {
        let mut resources = self.resources();
        let mut resolved = Vec::with_capacity(commands.len());

        for command in commands {
            let frame_command = match *command {
                RenderCommand::SetRootSignature { .. } => continue,
                RenderCommand::SetPipeline { pipeline } => {
                    resources.pipelines.get(&pipeline).cloned().map(FrameCommand::Pipeline)
                }
                RenderCommand::SetVertexBuffer { slot, buffer } => resources
                    .buffers
                    .get(&buffer)
                    .cloned()
                    .map(|b| FrameCommand::VertexBuffer(slot, b)),
                RenderCommand::SetIndexBuffer { buffer, format } => resources
                    .buffers
                    .get(&buffer)
                    .cloned()
                    .map(|b| FrameCommand::IndexBuffer(b, to_wgpu_index_format(format))),
                RenderCommand::SetConstantBuffer { slot, buffer }
                | RenderCommand::SetInstanceBuffer { slot, buffer } => resources
                    .buffer_bind_groups
                    .get(&buffer)
                    .cloned()
                    .map(|g| FrameCommand::BindGroup(slot, g)),
                RenderCommand::SetTexture { slot, descriptor } => resources
                    .descriptors
                    .get(&descriptor)
                    .cloned()
                    .map(|g| FrameCommand::BindGroup(slot, g)),
                RenderCommand::DrawIndexedInstanced {
                    index_count,
                    instance_count,
                } => Some(FrameCommand::Draw {
                    index_count,
                    instance_count,
                }),
            };

            match frame_command {
                Some(c) => resolved.push(c),
                None => {
                    // 绑定不完整时整批丢弃
                    tracing::warn!(target: "render", ?command, "unresolved render command, batch dropped");
                    return;
                }
            }
        }

        resources.pending.extend(resolved);
    }

    fn name(&self) -> &str {
        "wgpu"
    }
}
