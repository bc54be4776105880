//! 平滑后的当前参数
//!
//! 每个周期按 `current = α·target + (1-α)·current` 向目标快照收敛。
//! 刚度和阻尼从 0 开始，启动后逐渐加载，避免切入控制器时力矩突变。

use crate::target::ImpedanceTarget;
use armctl_math::{
    Matrix6, UnitQuaternion, Vector3, Vector7, low_pass, low_pass_orientation,
};

/// 当前实际使用的（平滑后）参数
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedGains {
    pub stiffness: Matrix6<f64>,
    pub damping: Matrix6<f64>,
    pub nullspace_stiffness: f64,
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub q_nullspace: Vector7,
}

impl SmoothedGains {
    /// 以给定位姿/构型为平衡点，刚度与阻尼为 0
    pub fn at_pose(position: Vector3<f64>, orientation: UnitQuaternion<f64>, q: Vector7) -> Self {
        Self {
            stiffness: Matrix6::zeros(),
            damping: Matrix6::zeros(),
            nullspace_stiffness: 0.0,
            position,
            orientation,
            q_nullspace: q,
        }
    }

    /// 向目标平滑一步
    pub fn step(&mut self, alpha: f64, target: &ImpedanceTarget) {
        self.stiffness = low_pass(alpha, target.stiffness, self.stiffness);
        self.damping = low_pass(alpha, target.damping, self.damping);
        self.nullspace_stiffness =
            low_pass(alpha, target.nullspace_stiffness, self.nullspace_stiffness);
        self.position = low_pass(alpha, target.position, self.position);
        self.orientation = low_pass_orientation(alpha, &target.orientation, &self.orientation);
        self.q_nullspace = low_pass(alpha, target.q_nullspace, self.q_nullspace);
    }
}
