//! # armctl-impedance - 笛卡尔阻抗控制律
//!
//! 1kHz 实时控制周期中，根据当前状态和目标位姿/刚度计算 7 个关节力矩。
//!
//! ## 包含模块
//!
//! - `config` - 控制器配置（arm_id、关节名、刚度增益、滤波系数等）
//! - `hardware` - 状态提供者与力矩输出接口
//! - `target` - 原子替换的目标快照与更新句柄
//! - `stiffness` - 对角 / 全耦合刚度更新
//! - `gains` - 平滑后的当前参数
//! - `controller` - Type State 控制器（未初始化 → 运行）
//!
//! ## 线程模型
//!
//! ```text
//! 位姿/刚度回调 ──TargetHandle::rcu──▶ ArcSwap<ImpedanceTarget> ──load()──▶ update()（实时）
//! ```
//!
//! 实时周期只做 `ArcSwap::load`，从不等待非实时写端。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use armctl_impedance::{CartesianImpedanceController, ImpedanceConfig};
//!
//! let config = ImpedanceConfig::load_from_file("impedance.toml")?;
//! let controller = CartesianImpedanceController::new(config)?;
//! let handle = controller.target_handle();
//! let mut controller = controller.start(&robot);
//!
//! loop {
//!     controller.update(&robot, &mut joints);
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gains;
pub mod hardware;
pub mod stiffness;
pub mod target;

pub use config::{
    DEFAULT_DAMPING_SCALE, DEFAULT_DELTA_TAU_MAX, DEFAULT_FILTER_PARAMS, ImpedanceConfig,
    NUM_CARTESIAN_AXES,
};
pub use controller::{CartesianImpedanceController, CycleOutput, Running, Uninitialized};
pub use error::{ConfigError, ImpedanceError};
pub use gains::SmoothedGains;
pub use hardware::{Frame, RobotState, RobotStateProvider, TorqueSink};
pub use stiffness::{DERIVE_DAMPING_SENTINEL, StiffnessMessage, StiffnessUpdate};
pub use target::{ImpedanceTarget, TargetHandle};
