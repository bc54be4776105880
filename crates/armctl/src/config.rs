//! 统一配置文件
//!
//! 一个 TOML 文件包含仲裁器和阻抗控制器两部分：
//!
//! ```toml
//! [arbiter]
//! default_controller = "joint_position_controller"
//! command_timeout = 0.2
//!
//! [impedance]
//! arm_id = "panda"
//! joint_names = ["panda_joint1", "panda_joint2", "panda_joint3", "panda_joint4",
//!                "panda_joint5", "panda_joint6", "panda_joint7"]
//! stiffness_gains = [200.0, 200.0, 200.0, 10.0, 10.0, 10.0]
//! ```
//!
//! `[impedance]` 可以省略（只运行仲裁器）。

use armctl_arbiter::ArbiterConfig;
use armctl_impedance::ImpedanceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum CoreConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `[arbiter]` 不合法
    #[error("Invalid [arbiter] section: {0}")]
    Arbiter(#[from] armctl_arbiter::ConfigError),

    /// `[impedance]` 不合法
    #[error("Invalid [impedance] section: {0}")]
    Impedance(#[from] armctl_impedance::ConfigError),
}

/// 运动控制核心配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionCoreConfig {
    /// 仲裁器配置
    pub arbiter: ArbiterConfig,
    /// 阻抗控制器配置
    pub impedance: Option<ImpedanceConfig>,
}

impl MotionCoreConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, CoreConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CoreConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 校验两部分配置
    pub fn validate(&self) -> Result<(), CoreConfigError> {
        self.arbiter.validate()?;
        if let Some(impedance) = &self.impedance {
            impedance.validate()?;
        }
        Ok(())
    }
}
