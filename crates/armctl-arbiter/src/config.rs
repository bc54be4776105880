//! 仲裁器配置
//!
//! 所有字段都有默认值，配置文件只需写出需要覆盖的项：
//!
//! ```toml
//! default_controller = "joint_position_controller"
//! command_timeout = 0.2
//!
//! [controllers]
//! joint_torque_controller = "effort_joint_torque_controller"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 命令超时上限（秒）
pub const MAX_COMMAND_TIMEOUT_SECS: f64 = 1.0;

/// 默认命令超时（秒）
pub const DEFAULT_COMMAND_TIMEOUT_SECS: f64 = 0.2;

/// 默认看门狗周期（毫秒，100Hz）
pub const DEFAULT_WATCHDOG_PERIOD_MS: u64 = 10;

/// 将命令超时钳位到 `[0, 1]` 秒
///
/// NaN 按 0 处理。
///
/// # 示例
///
/// ```
/// use armctl_arbiter::clamp_command_timeout;
/// use std::time::Duration;
///
/// assert_eq!(clamp_command_timeout(5.0), Duration::from_secs(1));
/// assert_eq!(clamp_command_timeout(-3.0), Duration::ZERO);
/// ```
pub fn clamp_command_timeout(seconds: f64) -> Duration {
    if !(seconds > 0.0) {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(seconds.min(MAX_COMMAND_TIMEOUT_SECS))
}

/// 8 个底层控制器的名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerNames {
    pub joint_position_controller: String,
    pub joint_velocity_controller: String,
    pub joint_torque_controller: String,
    pub joint_impedance_controller: String,
    pub cartesian_pose_controller: String,
    pub cartesian_impedance_controller: String,
    pub cartesian_force_controller: String,
    pub trajectory_controller: String,
}

impl Default for ControllerNames {
    fn default() -> Self {
        Self {
            joint_position_controller: "joint_position_controller".to_string(),
            joint_velocity_controller: "joint_velocity_controller".to_string(),
            joint_torque_controller: "joint_torque_controller".to_string(),
            joint_impedance_controller: "joint_impedance_controller".to_string(),
            cartesian_pose_controller: "cartesian_pose_controller".to_string(),
            cartesian_impedance_controller: "cartesian_impedance_controller".to_string(),
            cartesian_force_controller: "cartesian_force_controller".to_string(),
            trajectory_controller: "position_joint_trajectory_controller".to_string(),
        }
    }
}

impl ControllerNames {
    /// 按固定顺序列出 `(配置项, 名称)`
    pub fn slots(&self) -> [(&'static str, &str); 8] {
        [
            ("joint_position_controller", &self.joint_position_controller),
            ("joint_velocity_controller", &self.joint_velocity_controller),
            ("joint_torque_controller", &self.joint_torque_controller),
            ("joint_impedance_controller", &self.joint_impedance_controller),
            ("cartesian_pose_controller", &self.cartesian_pose_controller),
            ("cartesian_impedance_controller", &self.cartesian_impedance_controller),
            ("cartesian_force_controller", &self.cartesian_force_controller),
            ("trajectory_controller", &self.trajectory_controller),
        ]
    }
}

/// 仲裁器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// 默认控制器（命令超时后回退到此控制器）
    pub default_controller: String,

    /// 命令超时（秒），加载时钳位到 `[0, 1]`
    pub command_timeout: f64,

    /// 看门狗检查周期（毫秒）
    pub watchdog_period_ms: u64,

    /// 控制器名称
    pub controllers: ControllerNames,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            default_controller: "position_joint_trajectory_controller".to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT_SECS,
            watchdog_period_ms: DEFAULT_WATCHDOG_PERIOD_MS,
            controllers: ControllerNames::default(),
        }
    }
}

impl ArbiterConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 检查配置
    ///
    /// 默认控制器不在集合中不算配置错误：仲裁器仍可启动，
    /// 由 [`ControllerSet::validate`](crate::ControllerSet::validate) 记录错误日志。
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (slot, name) in self.controllers.slots() {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyControllerName { slot });
            }
        }
        if self.default_controller.trim().is_empty() {
            return Err(ConfigError::EmptyControllerName {
                slot: "default_controller",
            });
        }
        if self.watchdog_period_ms == 0 {
            return Err(ConfigError::InvalidWatchdogPeriod);
        }
        Ok(())
    }

    /// 钳位后的命令超时
    pub fn command_timeout(&self) -> Duration {
        clamp_command_timeout(self.command_timeout)
    }

    /// 看门狗周期
    pub fn watchdog_period(&self) -> Duration {
        Duration::from_millis(self.watchdog_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ArbiterConfig::default();
        assert_eq!(config.default_controller, "position_joint_trajectory_controller");
        assert_eq!(config.command_timeout(), Duration::from_millis(200));
        assert_eq!(config.watchdog_period(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_examples() {
        assert_eq!(clamp_command_timeout(5.0), Duration::from_secs(1));
        assert_eq!(clamp_command_timeout(-3.0), Duration::ZERO);
        assert_eq!(clamp_command_timeout(0.5), Duration::from_millis(500));
        assert_eq!(clamp_command_timeout(f64::NAN), Duration::ZERO);
        assert_eq!(clamp_command_timeout(f64::INFINITY), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml() {
        let config = ArbiterConfig::from_toml_str(
            r#"
default_controller = "joint_position_controller"
command_timeout = 3.0

[controllers]
joint_torque_controller = "effort_controller"
"#,
        )
        .unwrap();

        assert_eq!(config.default_controller, "joint_position_controller");
        assert_eq!(config.controllers.joint_torque_controller, "effort_controller");
        // 未写出的项保持默认
        assert_eq!(
            config.controllers.joint_velocity_controller,
            "joint_velocity_controller"
        );
        // 超出范围的超时被钳位
        assert_eq!(config.command_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ArbiterConfig::from_toml_str(
            r#"
[controllers]
joint_velocity_controller = ""
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyControllerName {
                slot: "joint_velocity_controller"
            }
        ));
    }

    #[test]
    fn test_zero_watchdog_period_rejected() {
        let err = ArbiterConfig::from_toml_str("watchdog_period_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWatchdogPeriod));
    }

    #[test]
    fn test_invalid_toml() {
        let err = ArbiterConfig::from_toml_str("command_timeout = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "command_timeout = 0.05").unwrap();

        let config = ArbiterConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.command_timeout(), Duration::from_millis(50));

        let missing = ArbiterConfig::load_from_file("/nonexistent/armctl.toml");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    proptest! {
        /// 任意输入钳位后都在 [0, 1] 秒内
        #[test]
        fn timeout_always_clamped(seconds in proptest::num::f64::ANY) {
            let timeout = clamp_command_timeout(seconds);
            prop_assert!(timeout <= Duration::from_secs(1));
        }
    }
}
