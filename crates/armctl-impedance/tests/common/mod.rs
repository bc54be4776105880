//! 测试用模拟机械臂
//!
//! 前 3 个关节直接对应末端 x/y/z（单位质量，无重力），姿态保持单位旋转。
//! 雅可比为 `[I₆ | 0]`，第 7 个关节只受零空间力矩影响。

#![allow(dead_code)]

use armctl_impedance::{Frame, RobotState, RobotStateProvider, TorqueSink};
use armctl_math::{Matrix6x7, Vector3, Vector7};

pub struct PointMassArm {
    pub state: RobotState,
    pub coriolis: Vector7,
}

impl PointMassArm {
    pub fn at(position: Vector3<f64>) -> Self {
        let mut arm = Self {
            state: RobotState::default(),
            coriolis: Vector7::zeros(),
        };
        arm.state.q[0] = position.x;
        arm.state.q[1] = position.y;
        arm.state.q[2] = position.z;
        arm.sync_pose();
        arm
    }

    /// 半隐式欧拉积分一步，并记录下发力矩为 `tau_J_d`
    pub fn step(&mut self, tau: &Vector7, dt: f64) {
        let accel = tau - self.coriolis;
        self.state.dq += accel * dt;
        // 旋转自由度固定
        for i in 3..6 {
            self.state.dq[i] = 0.0;
        }
        self.state.q += self.state.dq * dt;
        self.state.tau_j_d = *tau;
        self.sync_pose();
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.state.q[0], self.state.q[1], self.state.q[2])
    }

    fn sync_pose(&mut self) {
        self.state.o_t_ee[12] = self.state.q[0];
        self.state.o_t_ee[13] = self.state.q[1];
        self.state.o_t_ee[14] = self.state.q[2];
    }
}

impl RobotStateProvider for PointMassArm {
    fn robot_state(&self) -> RobotState {
        self.state
    }

    fn zero_jacobian(&self, _frame: Frame) -> Matrix6x7 {
        let mut jacobian = Matrix6x7::zeros();
        for i in 0..6 {
            jacobian[(i, i)] = 1.0;
        }
        jacobian
    }

    fn coriolis(&self) -> Vector7 {
        self.coriolis
    }
}

/// 记录每个周期的下发力矩
#[derive(Default)]
pub struct RecordingSink {
    pub history: Vec<Vector7>,
}

impl RecordingSink {
    pub fn last(&self) -> Vector7 {
        self.history.last().copied().unwrap_or_else(Vector7::zeros)
    }
}

impl TorqueSink for RecordingSink {
    fn set_torques(&mut self, tau: &Vector7) {
        self.history.push(*tau);
    }
}

pub fn panda_joint_names() -> Vec<String> {
    (1..=7).map(|i| format!("panda_joint{i}")).collect()
}
