//! 核心数学工具函数
//!
//! 欧拉角约定：先绕 X，再绕 Y，最后绕 Z（外旋），
//! 等价于 glam 的 `EulerRot::ZYX` 内旋顺序。

use glam::{EulerRot, Mat4, Quat, Vec3};

/// 欧拉角（弧度）转四元数
///
/// # 示例
///
/// ```rust
/// use glam::Vec3;
/// use particle_engine::core::utils::euler_to_quat;
///
/// let q = euler_to_quat(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
/// let v = q * Vec3::X;
/// assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
/// ```
#[inline]
pub fn euler_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x)
}

/// 由缩放、欧拉旋转、平移构建仿射矩阵
#[inline]
pub fn make_affine(scale: Vec3, rotation: Vec3, translate: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, euler_to_quat(rotation), translate)
}

/// 按轴门控的欧拉角
///
/// 对应轴的开关为 `false` 时该分量取 0。
#[inline]
pub fn gated_euler(rotation: Vec3, axes: [bool; 3]) -> Vec3 {
    Vec3::new(
        if axes[0] { rotation.x } else { 0.0 },
        if axes[1] { rotation.y } else { 0.0 },
        if axes[2] { rotation.z } else { 0.0 },
    )
}

/// 归一化，零向量返回零向量（不产生 NaN）
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}
