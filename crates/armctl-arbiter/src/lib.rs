//! # armctl-arbiter - 控制器仲裁层
//!
//! 把外部的"模式请求"（POSITION / VELOCITY / TORQUE / IMPEDANCE）映射为底层控制器的启动/停止，
//! 并在命令过期时自动切回默认控制器。
//!
//! ## 包含模块
//!
//! - `mode` - 控制模式与模式码
//! - `config` - 控制器名称、默认控制器、命令超时配置
//! - `controller_set` - 控制器集合
//! - `switcher` - 外部切换原语 trait
//! - `arbiter` - 仲裁器状态机
//! - `watchdog` - 命令超时看门狗线程
//! - `dispatch` - 命令分发线程
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use armctl_arbiter::{ArbiterConfig, ControllerArbiter, Watchdog, WatchdogConfig};
//! use std::sync::Arc;
//!
//! let config = ArbiterConfig::default();
//! let arbiter = Arc::new(ControllerArbiter::from_config(&config, my_switcher)?);
//! let watchdog = Watchdog::start(arbiter.clone(), WatchdogConfig::from(&config));
//!
//! arbiter.handle_command(3)?; // TORQUE
//! ```

pub mod arbiter;
pub mod config;
pub mod controller_set;
pub mod dispatch;
pub mod error;
pub mod mode;
pub mod switcher;
pub mod watchdog;

pub use arbiter::{ArbiterSnapshot, ControllerArbiter, WatchdogOutcome};
pub use config::{
    ArbiterConfig, ControllerNames, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_WATCHDOG_PERIOD_MS,
    MAX_COMMAND_TIMEOUT_SECS, clamp_command_timeout,
};
pub use controller_set::{ControllerEntry, ControllerSet};
pub use dispatch::{ArbiterCommand, CommandDispatcher, CommandSender};
pub use error::{ArbiterError, ConfigError, DispatchError, SwitchError};
pub use mode::ControlMode;
pub use switcher::{ControllerSwitcher, SwitchStrictness};
pub use watchdog::{Watchdog, WatchdogConfig};
