//! 控制模式定义
//!
//! 模式码与关节命令消息中的 `mode` 字段一致：
//!
//! | 模式 | 码 |
//! |---|---|
//! | POSITION | 1 |
//! | VELOCITY | 2 |
//! | TORQUE | 3 |
//! | IMPEDANCE | 4 |
//!
//! 笛卡尔位姿/阻抗/力控制器与轨迹控制器目前没有对应的模式码，
//! 在控制器集合中用 `None` 表示（见 [`ControllerEntry`](crate::ControllerEntry)）。

use crate::error::ArbiterError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 逻辑控制模式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// 关节位置控制
    Position = 1,
    /// 关节速度控制
    Velocity = 2,
    /// 关节力矩控制
    Torque = 3,
    /// 关节阻抗控制
    Impedance = 4,
}

impl ControlMode {
    /// 所有已定义的模式
    pub const ALL: [ControlMode; 4] = [
        ControlMode::Position,
        ControlMode::Velocity,
        ControlMode::Torque,
        ControlMode::Impedance,
    ];

    /// 从命令中的模式码解析
    ///
    /// 未定义的模式码返回 [`ArbiterError::UnknownMode`]。
    pub fn from_code(code: i32) -> Result<Self, ArbiterError> {
        Self::try_from(code).map_err(|_| ArbiterError::UnknownMode(code))
    }

    /// 模式码
    pub fn code(self) -> i32 {
        self.into()
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlMode::Position => "POSITION",
            ControlMode::Velocity => "VELOCITY",
            ControlMode::Torque => "TORQUE",
            ControlMode::Impedance => "IMPEDANCE",
        };
        f.write_str(name)
    }
}
