//! 进程内模拟硬件
//!
//! - [`SimulatedArm`]：末端 x/y/z 直接对应前三个关节的点质量模型，
//!   姿态固定为初始姿态，第 7 个关节只受零空间力矩作用
//! - [`LoggingSwitcher`]：记录激活控制器集合并打印切换日志

use armctl::arbiter::{ControllerSwitcher, SwitchError, SwitchStrictness};
use armctl::impedance::{Frame, RobotState, RobotStateProvider, TorqueSink};
use armctl::math::{Matrix6x7, Vector3, Vector7};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::info;

/// 模拟机械臂
#[derive(Debug, Clone)]
pub struct SimulatedArm {
    state: RobotState,
    /// 关节粘滞摩擦系数
    friction: f64,
}

impl SimulatedArm {
    /// 末端位于 `position`，姿态为单位旋转
    pub fn at(position: Vector3<f64>) -> Self {
        let mut arm = Self {
            state: RobotState::default(),
            friction: 0.5,
        };
        arm.state.q[0] = position.x;
        arm.state.q[1] = position.y;
        arm.state.q[2] = position.z;
        arm.sync_pose();
        arm
    }

    /// 积分一步（单位质量，半隐式欧拉）
    pub fn step(&mut self, tau: &Vector7, dt: f64) {
        let accel = tau - self.state.dq * self.friction;
        self.state.dq += accel * dt;
        for i in 3..6 {
            self.state.dq[i] = 0.0;
        }
        self.state.q += self.state.dq * dt;
        self.state.tau_j_d = *tau;
        self.sync_pose();
    }

    /// 末端位置
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.state.q[0], self.state.q[1], self.state.q[2])
    }

    fn sync_pose(&mut self) {
        self.state.o_t_ee[12] = self.state.q[0];
        self.state.o_t_ee[13] = self.state.q[1];
        self.state.o_t_ee[14] = self.state.q[2];
    }
}

impl RobotStateProvider for SimulatedArm {
    fn robot_state(&self) -> RobotState {
        self.state
    }

    fn zero_jacobian(&self, _frame: Frame) -> Matrix6x7 {
        Matrix6x7::identity()
    }

    fn coriolis(&self) -> Vector7 {
        Vector7::zeros()
    }
}

/// 保存最近一次下发的力矩
#[derive(Debug, Default)]
pub struct LatchedTorque {
    pub tau: Vector7,
}

impl TorqueSink for LatchedTorque {
    fn set_torques(&mut self, tau: &Vector7) {
        self.tau = *tau;
    }
}

/// 打印日志的切换原语
pub struct LoggingSwitcher {
    active: Mutex<Vec<String>>,
    started: Mutex<Vec<String>>,
    latency: Duration,
}

impl LoggingSwitcher {
    pub fn new(initially_active: impl Into<String>, latency: Duration) -> Self {
        Self {
            active: Mutex::new(vec![initially_active.into()]),
            started: Mutex::new(Vec::new()),
            latency,
        }
    }

    /// 当前激活的控制器
    pub fn active(&self) -> Vec<String> {
        self.active.lock().clone()
    }

    /// 按调用顺序记录的被启动控制器
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    /// `name` 是否被启动过
    pub fn has_started(&self, name: &str) -> bool {
        self.started.lock().iter().any(|n| n == name)
    }
}

impl ControllerSwitcher for LoggingSwitcher {
    fn switch_controllers(
        &self,
        start: &[String],
        stop: &[String],
        strictness: SwitchStrictness,
    ) -> Result<(), SwitchError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let mut active = self.active.lock();
        active.retain(|name| !stop.contains(name));
        for name in start {
            if !active.contains(name) {
                active.push(name.clone());
            }
        }
        self.started.lock().extend(start.iter().cloned());
        info!(?start, ?strictness, active = ?*active, "[sim] controllers switched");
        Ok(())
    }
}
