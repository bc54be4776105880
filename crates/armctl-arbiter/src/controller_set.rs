//! 控制器集合
//!
//! 有序的底层控制器列表，每个控制器可选地映射到一个 [`ControlMode`]。
//! 恰好一个控制器被指定为默认控制器。

use crate::config::ArbiterConfig;
use crate::mode::ControlMode;
use tracing::error;

/// 单个底层控制器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerEntry {
    /// 控制器名称（切换原语按名称启动/停止）
    pub name: String,
    /// 映射的控制模式；`None` 表示尚未定义模式码
    pub mode: Option<ControlMode>,
}

impl ControllerEntry {
    /// 映射到某个模式的控制器
    pub fn mapped(name: impl Into<String>, mode: ControlMode) -> Self {
        Self {
            name: name.into(),
            mode: Some(mode),
        }
    }

    /// 没有模式码的控制器
    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: None,
        }
    }
}

/// 控制器集合
#[derive(Debug, Clone)]
pub struct ControllerSet {
    entries: Vec<ControllerEntry>,
    default_controller: String,
}

impl ControllerSet {
    /// 创建控制器集合
    pub fn new(entries: Vec<ControllerEntry>, default_controller: impl Into<String>) -> Self {
        Self {
            entries,
            default_controller: default_controller.into(),
        }
    }

    /// 按配置构建 8 个控制器
    ///
    /// 关节位置/速度/力矩/阻抗控制器映射到对应模式；
    /// 笛卡尔位姿/阻抗/力控制器与轨迹控制器不映射。
    pub fn from_config(config: &ArbiterConfig) -> Self {
        let names = &config.controllers;
        let entries = vec![
            ControllerEntry::mapped(&names.joint_position_controller, ControlMode::Position),
            ControllerEntry::mapped(&names.joint_velocity_controller, ControlMode::Velocity),
            ControllerEntry::mapped(&names.joint_torque_controller, ControlMode::Torque),
            ControllerEntry::mapped(&names.joint_impedance_controller, ControlMode::Impedance),
            ControllerEntry::unmapped(&names.cartesian_pose_controller),
            ControllerEntry::unmapped(&names.cartesian_impedance_controller),
            ControllerEntry::unmapped(&names.cartesian_force_controller),
            ControllerEntry::unmapped(&names.trajectory_controller),
        ];
        Self::new(entries, config.default_controller.clone())
    }

    /// 检查默认控制器是否在集合中
    ///
    /// 缺失时只记录错误日志，不阻止仲裁器启动。
    pub fn validate(&self) -> bool {
        let ok = self.has_default();
        if !ok {
            error!(
                default = %self.default_controller,
                "Default controller not present in the provided controllers!"
            );
        }
        ok
    }

    /// 默认控制器是否在集合中
    pub fn has_default(&self) -> bool {
        self.contains(&self.default_controller)
    }

    /// 默认控制器名称
    pub fn default_controller(&self) -> &str {
        &self.default_controller
    }

    /// 所有控制器（按配置顺序）
    pub fn entries(&self) -> &[ControllerEntry] {
        &self.entries
    }

    /// 集合中是否有此名称
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// 映射到 `mode` 的控制器
    pub fn controller_for(&self, mode: ControlMode) -> Option<&ControllerEntry> {
        self.entries.iter().find(|e| e.mode == Some(mode))
    }

    /// 控制器映射的模式（未知名称或未映射均为 `None`）
    pub fn mode_of(&self, name: &str) -> Option<ControlMode> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.mode)
    }

    /// 启动 `start` 时需要停止的控制器：除 `start` 外的全部，去重并保持顺序
    pub fn stop_set_for(&self, start: &str) -> Vec<String> {
        let mut stop: Vec<String> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.name != start && !stop.contains(&entry.name) {
                stop.push(entry.name.clone());
            }
        }
        stop
    }
}
