//! armctl - 机械臂运动控制核心
//!
//! 两个相互独立的子系统：
//!
//! - **控制器仲裁** ([`arbiter`]): 模式请求 → 底层控制器切换，命令过期时回退到默认控制器
//! - **笛卡尔阻抗控制** ([`impedance`]): 每个实时周期计算 7 个关节力矩
//!
//! 两者只通过外部控制器切换原语组合：仲裁器可以停止阻抗控制器，阻抗控制器不知道仲裁器的存在。
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use armctl::prelude::*;
//!
//! armctl::logging::init_logger();
//! let config = MotionCoreConfig::load_from_file("armctl.toml")?;
//!
//! let arbiter = Arc::new(ControllerArbiter::from_config(&config.arbiter, switcher)?);
//! let watchdog = Watchdog::start(arbiter.clone(), WatchdogConfig::from(&config.arbiter));
//! ```

pub mod config;
pub mod logging;
pub mod prelude;

pub use armctl_arbiter as arbiter;
pub use armctl_impedance as impedance;
pub use armctl_math as math;

pub use config::{CoreConfigError, MotionCoreConfig};
