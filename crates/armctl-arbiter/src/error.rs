//! 仲裁层错误类型定义

use crate::mode::ControlMode;
use thiserror::Error;

/// 控制器切换原语返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    /// 控制器管理器拒绝了切换请求
    #[error("Controller manager rejected the switch: {0}")]
    Rejected(String),

    /// 请求启动的控制器未加载
    #[error("Controller '{0}' is not loaded")]
    NotLoaded(String),

    /// 控制器管理器不可用
    #[error("Controller manager unavailable: {0}")]
    Unavailable(String),
}

/// 仲裁器错误类型
#[derive(Error, Debug)]
pub enum ArbiterError {
    /// 命令中的模式码无法识别
    #[error("Unknown control mode code {0}, ignoring command")]
    UnknownMode(i32),

    /// 模式合法，但控制器集合中没有映射到该模式的控制器
    #[error("No controller is mapped to control mode {0}")]
    UnmappedMode(ControlMode),

    /// 切换原语返回失败（仲裁器状态保持不变）
    #[error("Failed to switch controllers (start: {start}): {source}")]
    SwitchFailed {
        /// 请求启动的控制器
        start: String,
        #[source]
        source: SwitchError,
    },

    /// 默认控制器不在控制器集合中
    #[error("Default controller '{0}' is not present in the provided controllers")]
    DefaultControllerMissing(String),
}

impl ArbiterError {
    /// 是否可以在下一个事件（命令或看门狗周期）重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, ArbiterError::SwitchFailed { .. })
    }
}

/// 命令分发错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// 命令队列已满
    #[error("Command queue full")]
    QueueFull,

    /// 分发线程已退出
    #[error("Command dispatcher closed")]
    Closed,
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// 控制器名称为空
    #[error("Controller name for '{slot}' must not be empty")]
    EmptyControllerName {
        /// 配置项名称
        slot: &'static str,
    },

    /// 看门狗周期为 0
    #[error("Watchdog period must be greater than 0 ms")]
    InvalidWatchdogPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arbiter_error_display() {
        let msg = format!("{}", ArbiterError::UnknownMode(42));
        assert!(msg.contains("42"), "UnknownMode message: {}", msg);

        let msg = format!("{}", ArbiterError::UnmappedMode(ControlMode::Torque));
        assert!(msg.contains("TORQUE"), "UnmappedMode message: {}", msg);

        let err = ArbiterError::SwitchFailed {
            start: "joint_torque_controller".to_string(),
            source: SwitchError::Rejected("busy".to_string()),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("joint_torque_controller") && msg.contains("busy"));

        let msg = format!("{}", ArbiterError::DefaultControllerMissing("x".to_string()));
        assert!(msg.contains("'x'"));
    }

    #[test]
    fn test_retryable() {
        let err = ArbiterError::SwitchFailed {
            start: "a".to_string(),
            source: SwitchError::Unavailable("down".to_string()),
        };
        assert!(err.is_retryable());
        assert!(!ArbiterError::UnknownMode(9).is_retryable());
        assert!(!ArbiterError::UnmappedMode(ControlMode::Velocity).is_retryable());
    }

    #[test]
    fn test_switch_error_source_chain() {
        use std::error::Error;

        let err = ArbiterError::SwitchFailed {
            start: "a".to_string(),
            source: SwitchError::NotLoaded("a".to_string()),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Controller 'a' is not loaded"));
    }
}
