//! 渲染后端抽象
//!
//! 粒子系统只通过 `GpuBackend` 与图形设备交互：创建缓冲区、写入缓冲区、
//! 提交录制好的命令列表。
//!
//! ## 设计目标
//!
//! - 粒子批处理逻辑与具体图形 API 解耦
//! - `RecordingBackend` 无需 GPU 即可完整测试批处理与绘制流程
//! - `WgpuBackend`（见 `wgpu_backend`）为生产实现

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 缓冲区描述符
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    /// 标签
    pub label: Option<String>,
    /// 大小（字节）
    pub size: u64,
    /// 用途
    pub usage: BufferUsage,
}

/// 缓冲区用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage(pub u32);

impl BufferUsage {
    pub const VERTEX: Self = Self(1);
    pub const INDEX: Self = Self(2);
    pub const UNIFORM: Self = Self(4);
    pub const STORAGE: Self = Self(8);
    pub const COPY_SRC: Self = Self(16);
    pub const COPY_DST: Self = Self(32);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// 抽象缓冲区句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferHandle(pub u64);

/// 管线状态句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub u64);

/// 根签名 / 管线布局句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootSignatureHandle(pub u64);

/// 着色器可见的描述符句柄（纹理等）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorHandle(pub u64);

/// 索引格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    Uint16,
    #[default]
    Uint32,
}

/// 渲染命令
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// 设置根签名
    SetRootSignature { root_signature: RootSignatureHandle },
    /// 设置管线
    SetPipeline { pipeline: PipelineHandle },
    /// 设置顶点缓冲区
    SetVertexBuffer { slot: u32, buffer: BufferHandle },
    /// 设置索引缓冲区
    SetIndexBuffer {
        buffer: BufferHandle,
        format: IndexFormat,
    },
    /// 绑定常量缓冲区（相机）
    SetConstantBuffer { slot: u32, buffer: BufferHandle },
    /// 绑定实例结构化缓冲区
    SetInstanceBuffer { slot: u32, buffer: BufferHandle },
    /// 绑定纹理描述符
    SetTexture {
        slot: u32,
        descriptor: DescriptorHandle,
    },
    /// 索引实例化绘制
    DrawIndexedInstanced {
        index_count: u32,
        instance_count: u32,
    },
}

impl RenderCommand {
    pub fn is_draw(&self) -> bool {
        matches!(self, RenderCommand::DrawIndexedInstanced { .. })
    }
}

/// 图形设备 Trait
///
/// 所有方法取 `&self`，实现者自行处理内部可变性
/// （wgpu 的 `Device` / `Queue` 本身即如此）。
///
/// # 示例
///
/// ```ignore
/// struct MyBackend { ... }
///
/// impl GpuBackend for MyBackend {
///     fn create_buffer(&self, desc: &BufferDescriptor) -> BufferHandle { ... }
///     fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) { ... }
///     fn submit(&self, commands: &[RenderCommand]) { ... }
/// }
/// ```
pub trait GpuBackend: Send + Sync {
    /// 创建缓冲区
    fn create_buffer(&self, desc: &BufferDescriptor) -> BufferHandle;

    /// 销毁缓冲区
    fn destroy_buffer(&self, buffer: BufferHandle);

    /// 写入缓冲区数据
    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// 提交渲染命令
    fn submit(&self, commands: &[RenderCommand]);

    /// 获取后端名称
    fn name(&self) -> &str;
}

/// 录制后端的内部状态
#[derive(Debug, Default, Clone)]
pub struct Recording {
    /// 存活缓冲区：句柄 → 描述符
    pub buffers: HashMap<BufferHandle, BufferDescriptor>,
    /// 每个缓冲区最近一次写入的数据
    pub contents: HashMap<BufferHandle, Vec<u8>>,
    /// 写入次数
    pub write_count: usize,
    /// 已提交的命令列表（每次 submit 一项）
    pub submissions: Vec<Vec<RenderCommand>>,
}

impl Recording {
    /// 所有提交中的绘制命令
    pub fn draw_calls(&self) -> Vec<(u32, u32)> {
        self.submissions
            .iter()
            .flatten()
            .filter_map(|c| match c {
                RenderCommand::DrawIndexedInstanced {
                    index_count,
                    instance_count,
                } => Some((*index_count, *instance_count)),
                _ => None,
            })
            .collect()
    }

    /// 最近一次提交
    pub fn last_submission(&self) -> Option<&[RenderCommand]> {
        self.submissions.last().map(|s| s.as_slice())
    }
}

/// 录制后端（用于测试与无头运行）
///
/// 记录所有缓冲区、写入与提交的命令。
pub struct RecordingBackend {
    next_buffer_id: AtomicU64,
    state: Mutex<Recording>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            next_buffer_id: AtomicU64::new(1),
            state: Mutex::new(Recording::default()),
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 访问录制状态
    pub fn recording(&self) -> MutexGuard<'_, Recording> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 清空已提交的命令
    pub fn clear_submissions(&self) {
        self.recording().submissions.clear();
    }
}

impl GpuBackend for RecordingBackend {
    fn create_buffer(&self, desc: &BufferDescriptor) -> BufferHandle {
        let handle = BufferHandle(self.next_buffer_id.fetch_add(1, Ordering::SeqCst));
        self.recording().buffers.insert(handle, desc.clone());
        handle
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut state = self.recording();
        state.buffers.remove(&buffer);
        state.contents.remove(&buffer);
    }

    fn write_buffer(&self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let mut state = self.recording();
        state.write_count += 1;
        let offset = offset as usize;
        let contents = state.contents.entry(buffer).or_default();
        if contents.len() < offset + data.len() {
            contents.resize(offset + data.len(), 0);
        }
        contents[offset..offset + data.len()].copy_from_slice(data);
    }

    fn submit(&self, commands: &[RenderCommand]) {
        self.recording().submissions.push(commands.to_vec());
    }

    fn name(&self) -> &str {
        "recording"
    }
}
