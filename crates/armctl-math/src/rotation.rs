//! SO(3) 工具
//!
//! - `O_T_EE`（列主序 4×4 齐次矩阵）解析为 `Isometry3`
//! - 四元数半球对齐（`q` 与 `-q` 表示同一旋转，取与参考点积非负的一支）
//! - 位姿误差：平移误差 + 差分四元数的轴角向量

use crate::{Isometry3, Matrix4, UnitQuaternion, Vector3, Vector6};
use nalgebra::{Rotation3, Translation3};

/// 将列主序的 4×4 齐次变换解析为 `Isometry3`
///
/// 旋转部分用 Shepperd 方法转为四元数后再归一化，
/// 传感器数据中轻微的非正交误差不会导致非单位四元数。
pub fn isometry_from_column_major(o_t_ee: &[f64; 16]) -> Isometry3<f64> {
    let m = Matrix4::from_column_slice(o_t_ee);
    let rotation = Rotation3::from_matrix_unchecked(m.fixed_view::<3, 3>(0, 0).into_owned());
    let q = UnitQuaternion::from_rotation_matrix(&rotation);
    let translation = Translation3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);

    Isometry3::from_parts(translation, UnitQuaternion::new_normalize(q.into_inner()))
}

/// 四元数半球对齐
///
/// 如果 `q` 与 `reference` 的点积为负，返回 `-q`，否则原样返回。
#[inline]
pub fn align_hemisphere(reference: &UnitQuaternion<f64>, q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    if reference.coords.dot(&q.coords) < 0.0 {
        UnitQuaternion::new_unchecked(-q.into_inner())
    } else {
        *q
    }
}

/// 姿态误差（轴角向量）
///
/// 先将 `orientation` 对齐到 `target` 所在半球，再计算差分四元数
/// `orientation · target⁻¹` 的 `axis · angle`。返回向量的模 ≤ π。
#[inline]
pub fn orientation_error(orientation: &UnitQuaternion<f64>, target: &UnitQuaternion<f64>) -> Vector3<f64> {
    let aligned = align_hemisphere(target, orientation);
    let error_quaternion = aligned * target.inverse();
    error_quaternion.scaled_axis()
}

/// 笛卡尔位姿误差 `[位置误差; 姿态误差]`
///
/// 位置误差为 `position - target_position`（当前减目标）。
#[inline]
pub fn pose_error(
    position: &Vector3<f64>,
    orientation: &UnitQuaternion<f64>,
    target_position: &Vector3<f64>,
    target_orientation: &UnitQuaternion<f64>,
) -> Vector6<f64> {
    let mut error = Vector6::zeros();
    error
        .fixed_rows_mut::<3>(0)
        .copy_from(&(position - target_position));
    error
        .fixed_rows_mut::<3>(3)
        .copy_from(&orientation_error(orientation, target_orientation));
    error
}
