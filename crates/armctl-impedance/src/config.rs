//! 笛卡尔阻抗控制器配置
//!
//! `arm_id`、`joint_names`（7 个）和 `stiffness_gains`（6 个）是必填项，
//! 其余参数都有默认值：
//!
//! ```toml
//! arm_id = "panda"
//! joint_names = ["panda_joint1", "panda_joint2", "panda_joint3", "panda_joint4",
//!                "panda_joint5", "panda_joint6", "panda_joint7"]
//! stiffness_gains = [200.0, 200.0, 200.0, 10.0, 10.0, 10.0]
//! filter_params = 0.005
//! ```

use crate::error::ConfigError;
use armctl_math::{DEFAULT_PINV_DAMPING, Matrix6, NUM_JOINTS, Vector6};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 笛卡尔自由度（3 平移 + 3 旋转）
pub const NUM_CARTESIAN_AXES: usize = 6;

/// 默认滤波系数 α
pub const DEFAULT_FILTER_PARAMS: f64 = 0.005;

/// 默认每周期最大力矩变化（Nm）
pub const DEFAULT_DELTA_TAU_MAX: f64 = 1.0;

/// 默认阻尼系数：`D = 2·√K`
pub const DEFAULT_DAMPING_SCALE: f64 = 2.0;

/// 笛卡尔阻抗控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpedanceConfig {
    /// 机械臂标识
    pub arm_id: String,

    /// 7 个关节名称
    pub joint_names: Vec<String>,

    /// 6 个笛卡尔刚度增益 `[x, y, z, rx, ry, rz]`
    pub stiffness_gains: Vec<f64>,

    /// 指数滤波系数 α ∈ (0, 1]
    pub filter_params: f64,

    /// 每周期最大力矩变化（Nm）
    pub delta_tau_max: f64,

    /// 由刚度推导阻尼时的系数（`D = scale·√K`）
    pub damping_scale: f64,

    /// 初始零空间刚度
    pub nullspace_stiffness: f64,

    /// 伪逆阻尼 λ
    pub pinv_damping: f64,
}

impl Default for ImpedanceConfig {
    fn default() -> Self {
        Self {
            arm_id: String::new(),
            joint_names: Vec::new(),
            stiffness_gains: Vec::new(),
            filter_params: DEFAULT_FILTER_PARAMS,
            delta_tau_max: DEFAULT_DELTA_TAU_MAX,
            damping_scale: DEFAULT_DAMPING_SCALE,
            nullspace_stiffness: 0.0,
            pinv_damping: DEFAULT_PINV_DAMPING,
        }
    }
}

impl ImpedanceConfig {
    /// 用必填项创建配置，其余参数取默认值
    pub fn new(
        arm_id: impl Into<String>,
        joint_names: Vec<String>,
        stiffness_gains: Vec<f64>,
    ) -> Self {
        Self {
            arm_id: arm_id.into(),
            joint_names,
            stiffness_gains,
            ..Default::default()
        }
    }

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
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arm_id.trim().is_empty() {
            return Err(ConfigError::MissingArmId);
        }
        if self.joint_names.len() != NUM_JOINTS {
            return Err(ConfigError::JointNameCount {
                expected: NUM_JOINTS,
                actual: self.joint_names.len(),
            });
        }
        if self.stiffness_gains.len() != NUM_CARTESIAN_AXES {
            return Err(ConfigError::StiffnessGainCount {
                expected: NUM_CARTESIAN_AXES,
                actual: self.stiffness_gains.len(),
            });
        }
        for (index, &value) in self.stiffness_gains.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidStiffnessGain { index, value });
            }
        }

        if !(self.filter_params > 0.0 && self.filter_params <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "filter_params",
                value: self.filter_params,
                expected: "(0, 1]",
            });
        }
        if !(self.delta_tau_max.is_finite() && self.delta_tau_max > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "delta_tau_max",
                value: self.delta_tau_max,
                expected: "> 0",
            });
        }
        for (name, value) in [
            ("damping_scale", self.damping_scale),
            ("nullspace_stiffness", self.nullspace_stiffness),
            ("pinv_damping", self.pinv_damping),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    expected: ">= 0",
                });
            }
        }
        Ok(())
    }

    /// 初始目标刚度（对角）
    pub fn stiffness_matrix(&self) -> Matrix6<f64> {
        Matrix6::from_diagonal(&self.gains())
    }

    /// 初始目标阻尼：`scale·√K`（对角）
    pub fn damping_matrix(&self) -> Matrix6<f64> {
        let scale = self.damping_scale;
        Matrix6::from_diagonal(&self.gains().map(|k| scale * k.sqrt()))
    }

    fn gains(&self) -> Vector6<f64> {
        Vector6::from_iterator(
            self.stiffness_gains
                .iter()
                .copied()
                .chain(std::iter::repeat(0.0))
                .take(NUM_CARTESIAN_AXES),
        )
    }
}
