//! # armctl-math - 控制栈共享数值工具
//!
//! **依赖原则**: 只依赖 `nalgebra`，所有函数都是纯函数，可在实时线程中调用。
//!
//! ## 包含模块
//!
//! - `pinv` - 阻尼伪逆（SVD）
//! - `saturation` - 力矩变化率饱和
//! - `rotation` - SO(3) 位姿误差、四元数半球对齐、`O_T_EE` 解析
//! - `filter` - 指数平滑滤波（标量 / 矩阵 / 姿态）
//!
//! ## 实时约束
//!
//! 所有类型都是 nalgebra 的静态尺寸矩阵，热路径上不会发生堆分配。

pub mod filter;
pub mod pinv;
pub mod rotation;
pub mod saturation;

use nalgebra::{SMatrix, SVector};

/// 机械臂自由度
pub const NUM_JOINTS: usize = 7;

/// 关节空间向量（7 维）
pub type Vector7 = SVector<f64, 7>;

/// 关节空间方阵（7×7）
pub type Matrix7 = SMatrix<f64, 7, 7>;

/// 几何雅可比（6×7）
pub type Matrix6x7 = SMatrix<f64, 6, 7>;

/// 雅可比转置（7×6）
pub type Matrix7x6 = SMatrix<f64, 7, 6>;

/// 笛卡尔空间向量与矩阵（nalgebra 自带别名）
pub use nalgebra::{Isometry3, Matrix3, Matrix4, Matrix6, UnitQuaternion, Vector3, Vector6};

pub use filter::{low_pass, low_pass_orientation};
pub use pinv::{DEFAULT_PINV_DAMPING, damped_pseudo_inverse};
pub use rotation::{align_hemisphere, isometry_from_column_major, orientation_error, pose_error};
pub use saturation::saturate_torque_rate;
