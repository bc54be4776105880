//! 刚度/阻尼更新
//!
//! 两种编码：
//!
//! - **对角**：6 个独立的轴向刚度，阻尼由刚度推导（`scale·√K`）或逐轴显式给出
//! - **全耦合**：平移、旋转各一个 3×3 刚度块和 3×3 阻尼块，允许轴间耦合；
//!   平移/旋转之间的非对角块为 0
//!
//! 原始消息 [`StiffnessMessage`] 用 `use_flag` 选择编码，转换时只读取被选中的字段。

use crate::error::ImpedanceError;
use armctl_math::{Matrix3, Matrix6, Vector6};

/// 对角模式下表示"由刚度推导阻尼"的哨兵值
pub const DERIVE_DAMPING_SENTINEL: f64 = -1.0;

/// 类型化的刚度/阻尼更新
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StiffnessUpdate {
    /// 对角刚度；`damping` 为 `None` 时按 `scale·√K` 推导
    Diagonal {
        stiffness: Vector6<f64>,
        damping: Option<Vector6<f64>>,
    },
    /// 全耦合刚度/阻尼（平移块 + 旋转块）
    Full {
        translational_stiffness: Matrix3<f64>,
        rotational_stiffness: Matrix3<f64>,
        translational_damping: Matrix3<f64>,
        rotational_damping: Matrix3<f64>,
    },
}

impl StiffnessUpdate {
    /// 生成 6×6 刚度和阻尼矩阵
    ///
    /// 任一元素非有限值时返回错误；推导阻尼时刚度不能为负。
    pub fn to_matrices(
        &self,
        damping_scale: f64,
    ) -> Result<(Matrix6<f64>, Matrix6<f64>), ImpedanceError> {
        match self {
            StiffnessUpdate::Diagonal { stiffness, damping } => {
                ensure_finite("stiffness", stiffness.iter())?;
                let damping = match damping {
                    Some(damping) => {
                        ensure_finite("damping", damping.iter())?;
                        *damping
                    },
                    None => {
                        if stiffness.iter().any(|&k| k < 0.0) {
                            return Err(ImpedanceError::InvalidTarget(
                                "cannot derive damping from negative stiffness".to_string(),
                            ));
                        }
                        stiffness.map(|k| damping_scale * k.sqrt())
                    },
                };
                Ok((
                    Matrix6::from_diagonal(stiffness),
                    Matrix6::from_diagonal(&damping),
                ))
            },
            StiffnessUpdate::Full {
                translational_stiffness,
                rotational_stiffness,
                translational_damping,
                rotational_damping,
            } => {
                ensure_finite(
                    "stiffness",
                    translational_stiffness.iter().chain(rotational_stiffness.iter()),
                )?;
                ensure_finite(
                    "damping",
                    translational_damping.iter().chain(rotational_damping.iter()),
                )?;
                Ok((
                    block_diagonal(translational_stiffness, rotational_stiffness),
                    block_diagonal(translational_damping, rotational_damping),
                ))
            },
        }
    }
}

fn ensure_finite<'a>(
    what: &str,
    mut values: impl Iterator<Item = &'a f64>,
) -> Result<(), ImpedanceError> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ImpedanceError::InvalidTarget(format!("non-finite {what} value")))
    }
}

fn block_diagonal(translational: &Matrix3<f64>, rotational: &Matrix3<f64>) -> Matrix6<f64> {
    let mut m = Matrix6::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(translational);
    m.fixed_view_mut::<3, 3>(3, 3).copy_from(rotational);
    m
}

/// 原始刚度消息
///
/// 字段布局与上游消息一致：对角 6 + 6 个值，全耦合 4 个行优先 3×3 块。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StiffnessMessage {
    /// 0 = 对角模式，其他值 = 全耦合模式
    pub use_flag: i32,
    /// `[x, y, z, xrot, yrot, zrot]`
    pub diagonal_stiffness: [f64; 6],
    /// `[bx, by, bz, bxrot, byrot, bzrot]`；`bx == -1` 表示由刚度推导
    pub diagonal_damping: [f64; 6],
    /// 平移刚度块（行优先 xx, xy, xz, yx, ...）
    pub translational_stiffness: [f64; 9],
    /// 旋转刚度块（行优先）
    pub rotational_stiffness: [f64; 9],
    /// 平移阻尼块（行优先）
    pub translational_damping: [f64; 9],
    /// 旋转阻尼块（行优先）
    pub rotational_damping: [f64; 9],
}

impl Default for StiffnessMessage {
    fn default() -> Self {
        Self {
            use_flag: 0,
            diagonal_stiffness: [0.0; 6],
            diagonal_damping: [DERIVE_DAMPING_SENTINEL; 6],
            translational_stiffness: [0.0; 9],
            rotational_stiffness: [0.0; 9],
            translational_damping: [0.0; 9],
            rotational_damping: [0.0; 9],
        }
    }
}

impl StiffnessMessage {
    /// 对角模式消息，阻尼由刚度推导
    pub fn diagonal(stiffness: [f64; 6]) -> Self {
        Self {
            diagonal_stiffness: stiffness,
            ..Default::default()
        }
    }

    /// 是否为对角模式
    pub fn is_diagonal(&self) -> bool {
        self.use_flag == 0
    }
}

impl From<&StiffnessMessage> for StiffnessUpdate {
    fn from(msg: &StiffnessMessage) -> Self {
        if msg.is_diagonal() {
            let damping = if msg.diagonal_damping[0] == DERIVE_DAMPING_SENTINEL {
                None
            } else {
                Some(Vector6::from(msg.diagonal_damping))
            };
            StiffnessUpdate::Diagonal {
                stiffness: Vector6::from(msg.diagonal_stiffness),
                damping,
            }
        } else {
            StiffnessUpdate::Full {
                translational_stiffness: Matrix3::from_row_slice(&msg.translational_stiffness),
                rotational_stiffness: Matrix3::from_row_slice(&msg.rotational_stiffness),
                translational_damping: Matrix3::from_row_slice(&msg.translational_damping),
                rotational_damping: Matrix3::from_row_slice(&msg.rotational_damping),
            }
        }
    }
}
