//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use armctl::prelude::*;
//! ```

// 仲裁层
pub use crate::arbiter::{
    ArbiterCommand, ArbiterConfig, ArbiterError, CommandDispatcher, ControlMode,
    ControllerArbiter, ControllerSwitcher, SwitchError, SwitchStrictness, Watchdog,
    WatchdogConfig,
};

// 阻抗控制层
pub use crate::impedance::{
    CartesianImpedanceController, Frame, ImpedanceConfig, ImpedanceError, RobotState,
    RobotStateProvider, StiffnessMessage, StiffnessUpdate, TargetHandle, TorqueSink,
};

// 配置
pub use crate::config::{CoreConfigError, MotionCoreConfig};
