//! 缓动函数库
//!
//! 33 个纯函数 `[0,1] → ℝ`，可通过枚举或整数索引选择。
//! 越界索引钳制为 `Linear`。Back / Elastic 曲线允许超出 `[0,1]`。
//!
//! 序列化时以整数索引表示，与关键帧文件格式一致。

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;
const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;

/// 缓动函数标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
#[repr(u32)]
pub enum EasingId {
    #[default]
    Linear = 0,

    HalfThresholdStep,
    FullThresholdStep,

    EaseInSine,
    EaseInQuad,
    EaseInCubic,
    EaseInQuart,
    EaseInQuint,
    EaseInExpo,
    EaseInCirc,
    EaseInBack,
    EaseInElastic,
    EaseInBounce,

    EaseOutSine,
    EaseOutQuad,
    EaseOutCubic,
    EaseOutQuart,
    EaseOutQuint,
    EaseOutExpo,
    EaseOutCirc,
    EaseOutBack,
    EaseOutElastic,
    EaseOutBounce,

    EaseInOutSine,
    EaseInOutQuad,
    EaseInOutCubic,
    EaseInOutQuart,
    EaseInOutQuint,
    EaseInOutExpo,
    EaseInOutCirc,
    EaseInOutBack,
    EaseInOutElastic,
    EaseInOutBounce,
}

impl EasingId {
    /// 全部缓动函数，顺序与整数索引一致
    pub const ALL: [EasingId; 33] = [
        EasingId::Linear,
        EasingId::HalfThresholdStep,
        EasingId::FullThresholdStep,
        EasingId::EaseInSine,
        EasingId::EaseInQuad,
        EasingId::EaseInCubic,
        EasingId::EaseInQuart,
        EasingId::EaseInQuint,
        EasingId::EaseInExpo,
        EasingId::EaseInCirc,
        EasingId::EaseInBack,
        EasingId::EaseInElastic,
        EasingId::EaseInBounce,
        EasingId::EaseOutSine,
        EasingId::EaseOutQuad,
        EasingId::EaseOutCubic,
        EasingId::EaseOutQuart,
        EasingId::EaseOutQuint,
        EasingId::EaseOutExpo,
        EasingId::EaseOutCirc,
        EasingId::EaseOutBack,
        EasingId::EaseOutElastic,
        EasingId::EaseOutBounce,
        EasingId::EaseInOutSine,
        EasingId::EaseInOutQuad,
        EasingId::EaseInOutCubic,
        EasingId::EaseInOutQuart,
        EasingId::EaseInOutQuint,
        EasingId::EaseInOutExpo,
        EasingId::EaseInOutCirc,
        EasingId::EaseInOutBack,
        EasingId::EaseInOutElastic,
        EasingId::EaseInOutBounce,
    ];

    /// 缓动函数数量
    pub const COUNT: usize = Self::ALL.len();

    /// 从整数索引获取，越界钳制为 `Linear`
    pub fn from_index(index: i64) -> Self {
        if index < 0 {
            return EasingId::Linear;
        }
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(EasingId::Linear)
    }

    /// 整数索引
    pub fn index(self) -> u32 {
        self as u32
    }

    /// 显示名
    pub fn name(self) -> &'static str {
        match self {
            EasingId::Linear => "Linear",
            EasingId::HalfThresholdStep => "HalfThresholdStep",
            EasingId::FullThresholdStep => "FullThresholdStep",
            EasingId::EaseInSine => "EaseInSine",
            EasingId::EaseInQuad => "EaseInQuad",
            EasingId::EaseInCubic => "EaseInCubic",
            EasingId::EaseInQuart => "EaseInQuart",
            EasingId::EaseInQuint => "EaseInQuint",
            EasingId::EaseInExpo => "EaseInExpo",
            EasingId::EaseInCirc => "EaseInCirc",
            EasingId::EaseInBack => "EaseInBack",
            EasingId::EaseInElastic => "EaseInElastic",
            EasingId::EaseInBounce => "EaseInBounce",
            EasingId::EaseOutSine => "EaseOutSine",
            EasingId::EaseOutQuad => "EaseOutQuad",
            EasingId::EaseOutCubic => "EaseOutCubic",
            EasingId::EaseOutQuart => "EaseOutQuart",
            EasingId::EaseOutQuint => "EaseOutQuint",
            EasingId::EaseOutExpo => "EaseOutExpo",
            EasingId::EaseOutCirc => "EaseOutCirc",
            EasingId::EaseOutBack => "EaseOutBack",
            EasingId::EaseOutElastic => "EaseOutElastic",
            EasingId::EaseOutBounce => "EaseOutBounce",
            EasingId::EaseInOutSine => "EaseInOutSine",
            EasingId::EaseInOutQuad => "EaseInOutQuad",
            EasingId::EaseInOutCubic => "EaseInOutCubic",
            EasingId::EaseInOutQuart => "EaseInOutQuart",
            EasingId::EaseInOutQuint => "EaseInOutQuint",
            EasingId::EaseInOutExpo => "EaseInOutExpo",
            EasingId::EaseInOutCirc => "EaseInOutCirc",
            EasingId::EaseInOutBack => "EaseInOutBack",
            EasingId::EaseInOutElastic => "EaseInOutElastic",
            EasingId::EaseInOutBounce => "EaseInOutBounce",
        }
    }

    /// 按显示名查找（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(name))
    }

    /// 计算缓动值
    pub fn evaluate(self, t: f32) -> f32 {
        match self {
            EasingId::Linear => t,
            EasingId::HalfThresholdStep => {
                if t < 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
            EasingId::FullThresholdStep => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }

            EasingId::EaseInSine => 1.0 - (t * PI * 0.5).cos(),
            EasingId::EaseInQuad => t * t,
            EasingId::EaseInCubic => t * t * t,
            EasingId::EaseInQuart => t.powi(4),
            EasingId::EaseInQuint => t.powi(5),
            EasingId::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            EasingId::EaseInCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            EasingId::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            EasingId::EaseInElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            EasingId::EaseInBounce => 1.0 - bounce_out(1.0 - t),

            EasingId::EaseOutSine => (t * PI * 0.5).sin(),
            EasingId::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingId::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingId::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            EasingId::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            EasingId::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            EasingId::EaseOutCirc => (1.0 - (t - 1.0) * (t - 1.0)).max(0.0).sqrt(),
            EasingId::EaseOutBack => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            EasingId::EaseOutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            EasingId::EaseOutBounce => bounce_out(t),

            EasingId::EaseInOutSine => -((PI * t).cos() - 1.0) * 0.5,
            EasingId::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            EasingId::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
            EasingId::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) * 0.5
                }
            }
            EasingId::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) * 0.5
                }
            }
            EasingId::EaseInOutExpo => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) * 0.5
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) * 0.5
                }
            }
            EasingId::EaseInOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) * 0.5
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) * 0.5
                }
            }
            EasingId::EaseInOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) * 0.5
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        * 0.5
                }
            }
            EasingId::EaseInOutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        * 0.5
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        * 0.5
                        + 1.0
                }
            }
            EasingId::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) * 0.5
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) * 0.5
                }
            }
        }
    }
}

impl From<u32> for EasingId {
    fn from(index: u32) -> Self {
        EasingId::from_index(index as i64)
    }
}

impl From<EasingId> for u32 {
    fn from(easing: EasingId) -> Self {
        easing.index()
    }
}

impl std::fmt::Display for EasingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 按函数形式计算缓动值
#[inline]
pub fn evaluate(easing: EasingId, t: f32) -> f32 {
    easing.evaluate(t)
}

fn bounce_out(mut t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        t -= 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        t -= 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        t -= 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}
