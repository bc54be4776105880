//! 力矩变化率饱和
//!
//! 每个控制周期内，指令力矩相对上一周期指令力矩的变化量被钳位到 `±delta_tau_max`。

use crate::Vector7;

/// 对期望力矩做变化率饱和
///
/// # 参数
///
/// - `tau_d_calculated`: 本周期计算出的期望力矩
/// - `tau_j_d`: 上一周期的指令力矩（由硬件状态提供）
/// - `delta_tau_max`: 每周期允许的最大变化量（Nm），必须 ≥ 0
///
/// # 返回
///
/// `tau_j_d + clamp(tau_d_calculated - tau_j_d, -delta_tau_max, delta_tau_max)`
///
/// # 示例
///
/// ```
/// use armctl_math::{Vector7, saturate_torque_rate};
///
/// let previous = Vector7::zeros();
/// let desired = Vector7::repeat(5.0);
/// let out = saturate_torque_rate(&desired, &previous, 1.0);
/// assert_eq!(out, Vector7::repeat(1.0));
/// ```
#[inline]
pub fn saturate_torque_rate(tau_d_calculated: &Vector7, tau_j_d: &Vector7, delta_tau_max: f64) -> Vector7 {
    tau_d_calculated.zip_map(tau_j_d, |desired, previous| {
        previous + (desired - previous).clamp(-delta_tau_max, delta_tau_max)
    })
}
