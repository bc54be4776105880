//! 阻抗控制层错误类型定义

use thiserror::Error;

/// 配置错误
///
/// 任一配置错误都会让控制器初始化失败，控制器不会进入运行状态。
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// 缺少 arm_id
    #[error("Could not read parameter arm_id")]
    MissingArmId,

    /// 关节名称数量不是 7
    #[error("Invalid or no joint_names parameters provided: expected {expected}, got {actual}")]
    JointNameCount { expected: usize, actual: usize },

    /// 刚度增益数量不是 6
    #[error("Invalid or no stiffness_gains parameters provided: expected {expected}, got {actual}")]
    StiffnessGainCount { expected: usize, actual: usize },

    /// 刚度增益为负数或非有限值
    #[error("Stiffness gain {index} must be finite and non-negative, got {value}")]
    InvalidStiffnessGain { index: usize, value: f64 },

    /// 其他数值参数越界
    #[error("Parameter '{name}' out of range: {value} (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// 阻抗控制错误类型
#[derive(Error, Debug)]
pub enum ImpedanceError {
    /// 配置错误（初始化失败）
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 目标位姿 / 刚度更新不合法（目标保持不变）
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

impl ImpedanceError {
    /// 是否为致命错误（控制器无法激活）
    pub fn is_fatal(&self) -> bool {
        matches!(self, ImpedanceError::Config(_))
    }
}
