//! 控制器切换原语
//!
//! 仲裁器通过此 trait 调用外部控制器管理器，按名称原子地启动/停止控制器。

use crate::error::SwitchError;
use std::sync::Arc;

/// 切换严格程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchStrictness {
    /// 尽力而为：忽略无法启动/停止的控制器
    #[default]
    BestEffort,
    /// 严格：任一控制器失败则整体失败
    Strict,
}

/// 外部控制器切换原语
///
/// # 约定
///
/// - 对硬件控制器的激活状态是原子的
/// - 应在有界时间内返回；慢切换只会拖慢看门狗周期
/// - 可能在不同线程中调用，因此要求 `Send + Sync`
pub trait ControllerSwitcher: Send + Sync {
    /// 启动 `start` 中的控制器并停止 `stop` 中的控制器
    fn switch_controllers(
        &self,
        start: &[String],
        stop: &[String],
        strictness: SwitchStrictness,
    ) -> Result<(), SwitchError>;
}

impl<S: ControllerSwitcher + ?Sized> ControllerSwitcher for Arc<S> {
    fn switch_controllers(
        &self,
        start: &[String],
        stop: &[String],
        strictness: SwitchStrictness,
    ) -> Result<(), SwitchError> {
        (**self).switch_controllers(start, stop, strictness)
    }
}

impl<S: ControllerSwitcher + ?Sized> ControllerSwitcher for Box<S> {
    fn switch_controllers(
        &self,
        start: &[String],
        stop: &[String],
        strictness: SwitchStrictness,
    ) -> Result<(), SwitchError> {
        (**self).switch_controllers(start, stop, strictness)
    }
}
