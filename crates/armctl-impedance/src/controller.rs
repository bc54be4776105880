//! 笛卡尔阻抗控制器（Type State Pattern）
//!
//! ```text
//! CartesianImpedanceController<Uninitialized> ──start()──▶ CartesianImpedanceController<Running>
//! ```
//!
//! - `new()` 校验配置，失败时不会得到控制器实例
//! - `start()` 捕获当前位姿和关节构型作为平衡点与零空间参考，只能调用一次
//! - `update()` 每个控制周期调用一次，计算并下发 7 个关节力矩
//!
//! 没有从运行态返回的转换：切出后重新切入时应重新创建控制器。
//!
//! # 控制律
//!
//! ```text
//! e        = [p - p_d; log(q · q_d⁻¹)]
//! τ_task   = Jᵀ · (-K·e - D·(J·dq))
//! τ_null   = (I - Jᵀ·J⁺ᵀ) · (k_n·(q_n - q) - 2·√k_n · dq)
//! τ_d      = sat(τ_task + τ_null + c, τ_J_d, Δτ_max)
//! ```

use crate::config::ImpedanceConfig;
use crate::error::ImpedanceError;
use crate::gains::SmoothedGains;
use crate::hardware::{Frame, RobotState, RobotStateProvider, TorqueSink};
use crate::target::{ImpedanceTarget, TargetHandle};
use armctl_math::{
    Matrix6x7, Matrix7, Vector6, Vector7, damped_pseudo_inverse, isometry_from_column_major,
    pose_error, saturate_torque_rate,
};
use tracing::{info, warn};

/// 未初始化（尚未捕获平衡点）
#[derive(Debug)]
pub struct Uninitialized;

/// 运行中
#[derive(Debug)]
pub struct Running {
    gains: SmoothedGains,
    cycles: u64,
}

/// 单个周期的中间结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutput {
    /// 位姿误差 `[平移; 旋转]`
    pub error: Vector6<f64>,
    /// 任务空间力矩
    pub tau_task: Vector7,
    /// 零空间力矩
    pub tau_nullspace: Vector7,
    /// 饱和后的下发力矩
    pub tau_command: Vector7,
}

/// 笛卡尔阻抗控制器
pub struct CartesianImpedanceController<State = Uninitialized> {
    config: ImpedanceConfig,
    target: TargetHandle,
    frame: Frame,
    state: State,
}

impl CartesianImpedanceController<Uninitialized> {
    /// 创建控制器
    ///
    /// 目标刚度取配置中的 6 个增益，目标阻尼为 `damping_scale·√K`。
    pub fn new(config: ImpedanceConfig) -> Result<Self, ImpedanceError> {
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "CartesianImpedanceController: aborting controller init");
            return Err(e.into());
        }

        let initial = ImpedanceTarget::new(
            config.stiffness_matrix(),
            config.damping_matrix(),
            config.nullspace_stiffness,
        );
        let target = TargetHandle::new(initial, config.damping_scale);

        info!(
            arm_id = %config.arm_id,
            filter_params = config.filter_params,
            delta_tau_max = config.delta_tau_max,
            "CartesianImpedanceController initialised"
        );

        Ok(Self {
            config,
            target,
            frame: Frame::EndEffector,
            state: Uninitialized,
        })
    }

    /// 指定雅可比参考坐标系（默认末端执行器）
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// 启动：以当前位姿为平衡点，以当前关节构型为零空间参考
    pub fn start<P>(self, provider: &P) -> CartesianImpedanceController<Running>
    where
        P: RobotStateProvider + ?Sized,
    {
        let robot_state = provider.robot_state();
        let pose = isometry_from_column_major(&robot_state.o_t_ee);
        let position = pose.translation.vector;
        let orientation = pose.rotation;

        self.target
            .reset_equilibrium(position, orientation, robot_state.q);

        info!(
            x = position.x,
            y = position.y,
            z = position.z,
            "CartesianImpedanceController started at current pose"
        );

        CartesianImpedanceController {
            config: self.config,
            target: self.target,
            frame: self.frame,
            state: Running {
                gains: SmoothedGains::at_pose(position, orientation, robot_state.q),
                cycles: 0,
            },
        }
    }
}

impl<State> CartesianImpedanceController<State> {
    /// 目标更新句柄（交给位姿/刚度回调使用）
    pub fn target_handle(&self) -> TargetHandle {
        self.target.clone()
    }

    /// 控制器配置
    pub fn config(&self) -> &ImpedanceConfig {
        &self.config
    }
}

impl CartesianImpedanceController<Running> {
    /// 执行一个控制周期
    ///
    /// 读取状态 → 计算力矩 → 饱和 → 下发 → 参数平滑。返回本周期下发的力矩。
    /// 不加锁，不分配内存，数值退化（奇异雅可比等）由阻尼伪逆吸收。
    pub fn update<P, K>(&mut self, provider: &P, sink: &mut K) -> Vector7
    where
        P: RobotStateProvider + ?Sized,
        K: TorqueSink + ?Sized,
    {
        let robot_state = provider.robot_state();
        let jacobian = provider.zero_jacobian(self.frame);
        let coriolis = provider.coriolis();

        let output = self.compute(&robot_state, &jacobian, &coriolis);
        sink.set_torques(&output.tau_command);

        let target = self.target.load();
        self.state.gains.step(self.config.filter_params, &target);
        self.state.cycles = self.state.cycles.wrapping_add(1);

        output.tau_command
    }

    /// 用当前平滑参数计算一个周期的力矩（不下发，不平滑）
    pub fn compute(
        &self,
        robot_state: &RobotState,
        jacobian: &Matrix6x7,
        coriolis: &Vector7,
    ) -> CycleOutput {
        let gains = &self.state.gains;
        let pose = isometry_from_column_major(&robot_state.o_t_ee);

        let error = pose_error(
            &pose.translation.vector,
            &pose.rotation,
            &gains.position,
            &gains.orientation,
        );

        let jacobian_t = jacobian.transpose();
        let jacobian_t_pinv = damped_pseudo_inverse(&jacobian_t, self.config.pinv_damping);

        let velocity = jacobian * robot_state.dq;
        let wrench = -(gains.stiffness * error) - gains.damping * velocity;
        let tau_task = jacobian_t * wrench;

        let projector = Matrix7::identity() - jacobian_t * jacobian_t_pinv;
        let k_null = gains.nullspace_stiffness;
        let tau_nullspace = projector
            * ((gains.q_nullspace - robot_state.q) * k_null
                - robot_state.dq * (2.0 * k_null.sqrt()));

        let tau_desired = tau_task + tau_nullspace + coriolis;
        let tau_command = if tau_desired.iter().all(|v| v.is_finite()) {
            saturate_torque_rate(&tau_desired, &robot_state.tau_j_d, self.config.delta_tau_max)
        } else {
            warn!("Non-finite torque computed; holding previous command");
            hold_previous(&robot_state.tau_j_d)
        };

        CycleOutput {
            error,
            tau_task,
            tau_nullspace,
            tau_command,
        }
    }

    /// 当前平滑参数
    pub fn gains(&self) -> &SmoothedGains {
        &self.state.gains
    }

    /// 已执行的周期数
    pub fn cycles(&self) -> u64 {
        self.state.cycles
    }
}

fn hold_previous(tau_j_d: &Vector7) -> Vector7 {
    if tau_j_d.iter().all(|v| v.is_finite()) {
        *tau_j_d
    } else {
        Vector7::zeros()
    }
}
