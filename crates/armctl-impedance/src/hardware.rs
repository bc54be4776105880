//! 硬件接口
//!
//! 控制律只通过这两个 trait 访问硬件：读取状态/模型，写出关节力矩。
//! 两者都会在实时周期内被调用，实现必须在有界时间内返回。

use armctl_math::{Matrix6x7, Vector7};

/// 机械臂状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotState {
    /// 关节位置（rad）
    pub q: Vector7,
    /// 关节速度（rad/s）
    pub dq: Vector7,
    /// 末端位姿 `O_T_EE`（4×4 齐次变换，列优先）
    pub o_t_ee: [f64; 16],
    /// 上一周期下发的期望力矩（Nm）
    pub tau_j_d: Vector7,
}

impl Default for RobotState {
    fn default() -> Self {
        let mut o_t_ee = [0.0; 16];
        o_t_ee[0] = 1.0;
        o_t_ee[5] = 1.0;
        o_t_ee[10] = 1.0;
        o_t_ee[15] = 1.0;
        Self {
            q: Vector7::zeros(),
            dq: Vector7::zeros(),
            o_t_ee,
            tau_j_d: Vector7::zeros(),
        }
    }
}

/// 雅可比参考坐标系
///
/// 与机械臂模型库提供的坐标系一一对应，控制器通过
/// [`with_frame`](crate::CartesianImpedanceController::with_frame) 选择，
/// 原样传给 [`RobotStateProvider::zero_jacobian`]。
/// 位姿误差始终基于 `O_T_EE` 计算，选择其他坐标系时调用方需保证两者一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frame {
    /// 第 1..=7 个关节坐标系
    Joint(u8),
    /// 法兰
    Flange,
    /// 末端执行器（`O_T_EE` 对应的坐标系）
    #[default]
    EndEffector,
    /// 刚度坐标系（相对末端执行器偏移的柔顺中心）
    Stiffness,
}

/// 状态与模型提供者
pub trait RobotStateProvider {
    /// 当前机械臂状态
    fn robot_state(&self) -> RobotState;

    /// 基座坐标系下的几何雅可比（6×7）
    fn zero_jacobian(&self, frame: Frame) -> Matrix6x7;

    /// 科氏力/离心力项（7）
    fn coriolis(&self) -> Vector7;
}

/// 关节力矩输出
pub trait TorqueSink {
    /// 每个周期调用一次，每个关节一个力矩值
    fn set_torques(&mut self, tau: &Vector7);
}

impl<P: RobotStateProvider + ?Sized> RobotStateProvider for &P {
    fn robot_state(&self) -> RobotState {
        (**self).robot_state()
    }

    fn zero_jacobian(&self, frame: Frame) -> Matrix6x7 {
        (**self).zero_jacobian(frame)
    }

    fn coriolis(&self) -> Vector7 {
        (**self).coriolis()
    }
}

impl<K: TorqueSink + ?Sized> TorqueSink for &mut K {
    fn set_torques(&mut self, tau: &Vector7) {
        (**self).set_torques(tau)
    }
}
