//! 管线状态标志与管线缓存接口
//!
//! 标志位布局（u64）：
//!
//! ```text
//! bits  0..12  类型      (Model / Sprite / Particle ...)
//! bits 12..20  混合模式  (Add / Sub / Multiply / Screen, Normal = 0)
//! bits 20..24  剔除模式  (Front / Back, None = 0)
//! bits 24..36  深度模式
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::backend::{PipelineHandle, RootSignatureHandle};

/// 管线状态标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PsoFlags(pub u64);

impl PsoFlags {
    pub const NONE: Self = Self(0);

    // 类型
    pub const TYPE_MODEL: Self = Self(1 << 0);
    pub const TYPE_SPRITE: Self = Self(1 << 1);
    pub const TYPE_PARTICLE: Self = Self(1 << 3);

    // 混合模式
    pub const BLEND_NORMAL: Self = Self(0);
    pub const BLEND_ADD: Self = Self(1 << 12);
    pub const BLEND_SUB: Self = Self(1 << 13);
    pub const BLEND_MULTIPLY: Self = Self(1 << 14);
    pub const BLEND_SCREEN: Self = Self(1 << 15);

    // 剔除模式
    pub const CULL_NONE: Self = Self(0);
    pub const CULL_FRONT: Self = Self(1 << 20);
    pub const CULL_BACK: Self = Self(1 << 21);

    // 深度模式
    pub const DEPTH_ENABLE: Self = Self(1 << 24);
    pub const DEPTH_WRITE_ALL: Self = Self(1 << 25);
    pub const DEPTH_WRITE_ZERO: Self = Self(1 << 26);
    pub const DEPTH_LESS_EQUAL: Self = Self(1 << 27);

    pub const TYPE_MASK: u64 = 0x0000_0000_0000_0FFF;
    pub const BLEND_MASK: u64 = 0x0000_0000_000F_F000;
    pub const CULL_MASK: u64 = 0x0000_0000_00F0_0000;
    pub const DEPTH_MASK: u64 = 0x0000_000F_FF00_0000;

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn type_bits(&self) -> u64 {
        self.0 & Self::TYPE_MASK
    }

    pub fn blend_bits(&self) -> u64 {
        self.0 & Self::BLEND_MASK
    }

    pub fn cull_bits(&self) -> u64 {
        self.0 & Self::CULL_MASK
    }
}

impl std::ops::BitOr for PsoFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for PsoFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// 混合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    #[default]
    Add,
    Sub,
    Multiply,
    Screen,
}

impl BlendMode {
    pub fn flags(self) -> PsoFlags {
        match self {
            BlendMode::Normal => PsoFlags::BLEND_NORMAL,
            BlendMode::Add => PsoFlags::BLEND_ADD,
            BlendMode::Sub => PsoFlags::BLEND_SUB,
            BlendMode::Multiply => PsoFlags::BLEND_MULTIPLY,
            BlendMode::Screen => PsoFlags::BLEND_SCREEN,
        }
    }
}

/// 粒子渲染设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ParticleRenderSettings {
    pub blend_mode: BlendMode,
    pub cull_back: bool,
}

impl ParticleRenderSettings {
    pub fn new(blend_mode: BlendMode, cull_back: bool) -> Self {
        Self {
            blend_mode,
            cull_back,
        }
    }

    /// 混合 + 剔除 + 深度（只测试不写入）
    pub fn pso_flags(&self) -> PsoFlags {
        let cull = if self.cull_back {
            PsoFlags::CULL_BACK
        } else {
            PsoFlags::CULL_NONE
        };
        self.blend_mode.flags()
            | cull
            | PsoFlags::DEPTH_ENABLE
            | PsoFlags::DEPTH_WRITE_ZERO
            | PsoFlags::DEPTH_LESS_EQUAL
    }

    /// 粒子管线的完整标志
    pub fn particle_flags(&self) -> PsoFlags {
        self.pso_flags() | PsoFlags::TYPE_PARTICLE
    }
}

/// 着色器 / 管线缓存
pub trait PipelineCache: Send + Sync {
    /// 获取管线状态对象
    fn pipeline_state(&self, flags: PsoFlags) -> Option<PipelineHandle>;

    /// 获取根签名
    fn root_signature(&self, flags: PsoFlags) -> Option<RootSignatureHandle>;
}

/// 预先注册的管线表
///
/// 根签名按类型位查找，管线按完整标志查找。
#[derive(Debug, Default, Clone)]
pub struct StaticPipelineCache {
    pipelines: HashMap<PsoFlags, PipelineHandle>,
    root_signatures: HashMap<u64, RootSignatureHandle>,
}

impl StaticPipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pipeline(&mut self, flags: PsoFlags, pipeline: PipelineHandle) {
        self.pipelines.insert(flags, pipeline);
    }

    pub fn register_root_signature(&mut self, type_flags: PsoFlags, root: RootSignatureHandle) {
        self.root_signatures.insert(type_flags.type_bits(), root);
    }

    /// 为所有混合 / 剔除组合注册粒子管线，句柄从 `first_id` 起递增
    pub fn with_all_particle_pipelines(first_id: u64) -> Self {
        let mut cache = Self::new();
        let mut next = first_id;
        for blend_mode in [
            BlendMode::Normal,
            BlendMode::Add,
            BlendMode::Sub,
            BlendMode::Multiply,
            BlendMode::Screen,
        ] {
            for cull_back in [false, true] {
                let settings = ParticleRenderSettings::new(blend_mode, cull_back);
                cache.register_pipeline(settings.particle_flags(), PipelineHandle(next));
                next += 1;
            }
        }
        cache.register_root_signature(PsoFlags::TYPE_PARTICLE, RootSignatureHandle(next));
        cache
    }
}

impl PipelineCache for StaticPipelineCache {
    fn pipeline_state(&self, flags: PsoFlags) -> Option<PipelineHandle> {
        self.pipelines.get(&flags).copied()
    }

    fn root_signature(&self, flags: PsoFlags) -> Option<RootSignatureHandle> {
        self.root_signatures.get(&flags.type_bits()).copied()
    }
}
