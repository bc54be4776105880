//! 指数平滑滤波
//!
//! ```text
//! current = α · target + (1 - α) · current
//! ```
//!
//! 用于刚度、阻尼、零空间参数和目标位姿的逐周期平滑，避免目标突变带来的力矩跳变。

use crate::UnitQuaternion;
use nalgebra::Unit;
use std::f64::consts::TAU;
use std::ops::{Add, Mul};

/// 轴向量模长低于此值时认为轴角表示退化
const AXIS_NORM_THRESHOLD: f64 = 1e-12;

/// 一步指数平滑
///
/// 适用于 `f64` 以及 nalgebra 的静态矩阵/向量。
///
/// # 示例
///
/// ```
/// use armctl_math::low_pass;
///
/// assert_eq!(low_pass(1.0, 10.0, 0.0), 10.0);
/// assert_eq!(low_pass(0.5, 10.0, 0.0), 5.0);
/// ```
#[inline]
pub fn low_pass<T>(alpha: f64, target: T, current: T) -> T
where
    T: Mul<f64, Output = T> + Add<Output = T>,
{
    target * alpha + current * (1.0 - alpha)
}

/// 姿态的指数平滑（轴角表示）
///
/// 轴向量和角度分别做指数平滑后重建四元数。平滑前把目标写成与当前轴同向的
/// 等价形式：两轴点积为负时 `(axis, θ)` 改写为 `(-axis, 2π - θ)`，
/// 否则跨越 `θ = π` 的目标会让平均后的轴停在当前轴上。
/// 单位旋转没有确定的轴，取另一方的轴。
pub fn low_pass_orientation(
    alpha: f64,
    target: &UnitQuaternion<f64>,
    current: &UnitQuaternion<f64>,
) -> UnitQuaternion<f64> {
    let (target_axis, mut target_angle, current_axis, current_angle) =
        match (target.axis_angle(), current.axis_angle()) {
            (Some((t, ta)), Some((c, ca))) => (t.into_inner(), ta, c.into_inner(), ca),
            (Some((t, ta)), None) => (t.into_inner(), ta, t.into_inner(), 0.0),
            (None, Some((c, ca))) => (c.into_inner(), 0.0, c.into_inner(), ca),
            (None, None) => return *target,
        };

    let mut target_axis = target_axis;
    if target_axis.dot(&current_axis) < 0.0 {
        target_axis = -target_axis;
        target_angle = TAU - target_angle;
    }

    let axis = low_pass(alpha, target_axis, current_axis);
    let angle = low_pass(alpha, target_angle, current_angle);

    match Unit::try_new(axis, AXIS_NORM_THRESHOLD) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle),
        None => current.nlerp(target, alpha),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Matrix6, Vector3, Vector7};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_alpha_one_reaches_target_in_one_step() {
        let target = Matrix6::from_diagonal_element(300.0);
        let current = Matrix6::zeros();
        assert_eq!(low_pass(1.0, target, current), target);
    }

    #[test]
    fn test_alpha_zero_holds_current() {
        let target = Vector7::repeat(1.0);
        let current = Vector7::repeat(-1.0);
        assert_eq!(low_pass(0.0, target, current), current);
    }

    #[test]
    fn test_orientation_alpha_one() {
        let target = UnitQuaternion::from_euler_angles(0.2, -0.4, 0.9);
        let current = UnitQuaternion::from_euler_angles(-0.3, 0.1, 0.0);

        let filtered = low_pass_orientation(1.0, &target, &current);
        assert!(filtered.angle_to(&target) < 1e-9);
    }

    #[test]
    fn test_orientation_from_identity() {
        let target = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 1.0);
        let current = UnitQuaternion::identity();

        // 单位旋转取目标的轴
        let mut q = current;
        for _ in 0..2000 {
            q = low_pass_orientation(0.01, &target, &q);
        }
        assert!(q.angle_to(&target) < 1e-6);
    }

    #[test]
    fn test_orientation_opposite_axes_stay_unit() {
        let target = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.5);
        let current = UnitQuaternion::from_axis_angle(&-Vector3::x_axis(), 0.5);

        let filtered = low_pass_orientation(0.5, &target, &current);
        assert!(filtered.coords.iter().all(|v| v.is_finite()));
        assert_relative_eq!(filtered.coords.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_across_pi_converges() {
        // 朝下的夹爪跨过 π：两端的轴角表示轴方向相反
        let current = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI - 0.1);
        let target = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI + 0.1);
        assert_relative_eq!(current.angle_to(&target), 0.2, epsilon = 1e-9);

        let mut q = current;
        for _ in 0..20000 {
            q = low_pass_orientation(0.005, &target, &q);
        }
        assert!(q.angle_to(&target) < 1e-3);
    }

    #[test]
    fn test_orientation_across_pi_moves_every_step() {
        let current = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI - 0.05);
        let target = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI + 0.05);

        let filtered = low_pass_orientation(0.5, &target, &current);
        assert_relative_eq!(filtered.angle_to(&target), 0.05, epsilon = 1e-9);
        assert_relative_eq!(filtered.angle_to(&current), 0.05, epsilon = 1e-9);
    }

    fn unit_quaternion() -> impl Strategy<Value = UnitQuaternion<f64>> {
        (-PI..PI, -PI / 2.0..PI / 2.0, -PI..PI)
            .prop_map(|(r, p, y)| UnitQuaternion::from_euler_angles(r, p, y))
    }

    proptest! {
        /// 任意起止姿态（含轴向相反的情况）反复滤波收敛到目标
        #[test]
        fn repeated_orientation_filter_converges(
            target in unit_quaternion(),
            start in unit_quaternion(),
            alpha in 0.05..1.0f64,
        ) {
            let mut q = start;
            for _ in 0..2000 {
                q = low_pass_orientation(alpha, &target, &q);
            }
            prop_assert!(q.angle_to(&target) < 1e-6);
        }

        /// 轴相同、角度分列 π 两侧
        #[test]
        fn orientation_filter_converges_across_pi(
            delta_start in 0.001..0.5f64,
            delta_target in 0.001..0.5f64,
            axis in (-1.0..1.0f64, -1.0..1.0f64, -1.0..1.0f64),
        ) {
            let axis = Vector3::new(axis.0, axis.1, axis.2);
            prop_assume!(axis.norm() > 1e-3);
            let axis = Unit::new_normalize(axis);
            let start = UnitQuaternion::from_axis_angle(&axis, PI - delta_start);
            let target = UnitQuaternion::from_axis_angle(&axis, PI + delta_target);

            let mut q = start;
            for _ in 0..3000 {
                q = low_pass_orientation(0.01, &target, &q);
            }
            prop_assert!(q.angle_to(&target) < 1e-6);
        }

        /// 目标固定时反复滤波收敛到目标
        #[test]
        fn repeated_filter_converges(
            target in -1000.0..1000.0f64,
            start in -1000.0..1000.0f64,
            alpha in 0.01..1.0f64,
        ) {
            let mut current = start;
            for _ in 0..5000 {
                current = low_pass(alpha, target, current);
            }
            prop_assert!((current - target).abs() < 1e-6);
        }
    }
}
