//! 阻抗目标快照
//!
//! 目标位姿、刚度、阻尼和零空间参数保存在一个不可变快照中，通过 `ArcSwap` 原子替换：
//!
//! - 写端（位姿/刚度回调，非实时）：`rcu` 克隆当前快照、修改、发布
//! - 读端（实时控制周期）：`load()`，wait-free，不分配内存
//!
//! 多个写端并发时 `rcu` 会重试，每次更新都基于最新快照，不会丢失其他字段的修改。

use crate::error::ImpedanceError;
use crate::stiffness::{StiffnessMessage, StiffnessUpdate};
use arc_swap::ArcSwap;
use arc_swap::Guard;
use armctl_math::{Matrix6, UnitQuaternion, Vector3, Vector7, align_hemisphere};
use nalgebra::Quaternion;
use std::sync::Arc;
use tracing::debug;

/// 四元数模长低于此值时拒绝
const MIN_QUATERNION_NORM: f64 = 1e-9;

/// 阻抗目标（不可变快照）
#[derive(Debug, Clone, PartialEq)]
pub struct ImpedanceTarget {
    /// 目标末端位置
    pub position: Vector3<f64>,
    /// 目标末端姿态
    pub orientation: UnitQuaternion<f64>,
    /// 目标笛卡尔刚度（6×6）
    pub stiffness: Matrix6<f64>,
    /// 目标笛卡尔阻尼（6×6）
    pub damping: Matrix6<f64>,
    /// 目标零空间刚度
    pub nullspace_stiffness: f64,
    /// 零空间参考关节构型
    pub q_nullspace: Vector7,
}

impl ImpedanceTarget {
    /// 原点、单位姿态，刚度和阻尼由调用方给出
    pub fn new(stiffness: Matrix6<f64>, damping: Matrix6<f64>, nullspace_stiffness: f64) -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            stiffness,
            damping,
            nullspace_stiffness,
            q_nullspace: Vector7::zeros(),
        }
    }
}

/// 目标更新句柄
///
/// 可克隆，可跨线程；所有克隆共享同一个快照。
#[derive(Clone)]
pub struct TargetHandle {
    inner: Arc<ArcSwap<ImpedanceTarget>>,
    damping_scale: f64,
}

impl TargetHandle {
    pub(crate) fn new(initial: ImpedanceTarget, damping_scale: f64) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial)),
            damping_scale,
        }
    }

    /// 更新目标位姿
    ///
    /// 四元数被归一化，并与上一个目标对齐到同一半球。只替换目标值，
    /// 平滑后的当前值在之后的周期中逐步收敛。
    pub fn set_equilibrium_pose(
        &self,
        position: Vector3<f64>,
        orientation: Quaternion<f64>,
    ) -> Result<(), ImpedanceError> {
        if !position.iter().all(|v| v.is_finite()) {
            return Err(ImpedanceError::InvalidTarget(
                "non-finite target position".to_string(),
            ));
        }
        if !orientation.coords.iter().all(|v| v.is_finite())
            || orientation.norm() < MIN_QUATERNION_NORM
        {
            return Err(ImpedanceError::InvalidTarget(
                "target orientation is not a valid quaternion".to_string(),
            ));
        }
        let orientation = UnitQuaternion::from_quaternion(orientation);

        self.inner.rcu(|current| {
            let mut next = ImpedanceTarget::clone(current);
            next.position = position;
            next.orientation = align_hemisphere(&current.orientation, &orientation);
            next
        });
        Ok(())
    }

    /// 更新刚度/阻尼
    pub fn set_stiffness(&self, update: &StiffnessUpdate) -> Result<(), ImpedanceError> {
        let (stiffness, damping) = update.to_matrices(self.damping_scale)?;

        self.inner.rcu(|current| {
            let mut next = ImpedanceTarget::clone(current);
            next.stiffness = stiffness;
            next.damping = damping;
            next
        });
        debug!(
            diagonal = matches!(update, StiffnessUpdate::Diagonal { .. }),
            "Impedance stiffness target updated"
        );
        Ok(())
    }

    /// 用原始刚度消息更新（按 `use_flag` 选择编码）
    pub fn apply_stiffness_message(&self, msg: &StiffnessMessage) -> Result<(), ImpedanceError> {
        self.set_stiffness(&StiffnessUpdate::from(msg))
    }

    /// 更新零空间刚度
    pub fn set_nullspace_stiffness(&self, stiffness: f64) -> Result<(), ImpedanceError> {
        if !(stiffness.is_finite() && stiffness >= 0.0) {
            return Err(ImpedanceError::InvalidTarget(format!(
                "nullspace stiffness must be finite and non-negative, got {stiffness}"
            )));
        }
        self.inner.rcu(|current| {
            let mut next = ImpedanceTarget::clone(current);
            next.nullspace_stiffness = stiffness;
            next
        });
        Ok(())
    }

    /// 更新零空间参考构型
    pub fn set_nullspace_configuration(&self, q: Vector7) -> Result<(), ImpedanceError> {
        if !q.iter().all(|v| v.is_finite()) {
            return Err(ImpedanceError::InvalidTarget(
                "non-finite nullspace configuration".to_string(),
            ));
        }
        self.inner.rcu(|current| {
            let mut next = ImpedanceTarget::clone(current);
            next.q_nullspace = q;
            next
        });
        Ok(())
    }

    /// 当前目标快照
    pub fn snapshot(&self) -> Arc<ImpedanceTarget> {
        self.inner.load_full()
    }

    /// 实时读取（不增加引用计数）
    pub(crate) fn load(&self) -> Guard<Arc<ImpedanceTarget>> {
        self.inner.load()
    }

    /// 启动时把目标设为当前位姿/构型
    pub(crate) fn reset_equilibrium(
        &self,
        position: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
        q: Vector7,
    ) {
        self.inner.rcu(|current| {
            let mut next = ImpedanceTarget::clone(current);
            next.position = position;
            next.orientation = orientation;
            next.q_nullspace = q;
            next
        });
    }
}

impl std::fmt::Debug for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetHandle")
            .field("target", &self.inner.load())
            .field("damping_scale", &self.damping_scale)
            .finish()
    }
}
