//! 控制器仲裁器
//!
//! 负责逻辑控制模式到底层控制器的映射、当前激活控制器的跟踪，以及命令超时后的自动回退。
//!
//! # 并发
//!
//! 命令回调、超时配置回调和看门狗周期可能在不同线程中执行，
//! 它们都先获取同一把 `parking_lot::Mutex`，在整个检查/切换过程中持有，结束后立即释放。
//!
//! ```text
//! ┌──────────────────────┐
//! │  ControllerArbiter   │
//! ├──────────────────────┤
//! │ controllers          │ ← 只读（初始化后不变）
//! │ switcher             │ ← 外部切换原语
//! │ state                │ ← Mutex<ArbiterState>
//! └──────────────────────┘
//! ```

use crate::config::{ArbiterConfig, MAX_COMMAND_TIMEOUT_SECS, clamp_command_timeout};
use crate::controller_set::ControllerSet;
use crate::error::{ArbiterError, ConfigError};
use crate::mode::ControlMode;
use crate::switcher::{ControllerSwitcher, SwitchStrictness};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 仲裁器内部状态（只在锁内读写）
#[derive(Debug, Clone)]
struct ArbiterState {
    current_controller: String,
    current_mode: Option<ControlMode>,
    last_command: Option<Instant>,
    command_timeout: Duration,
}

/// 仲裁器状态快照（用于诊断）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbiterSnapshot {
    /// 当前激活的控制器
    pub current_controller: String,
    /// 当前模式（激活控制器未映射模式时为 `None`）
    pub current_mode: Option<ControlMode>,
    /// 最近一次成功应用的命令时间
    pub last_command: Option<Instant>,
    /// 命令超时
    pub command_timeout: Duration,
}

/// 看门狗一次检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOutcome {
    /// 尚未收到过有效命令
    NoCommandYet,
    /// 命令仍然新鲜
    Fresh,
    /// 已超时，但当前就是默认控制器
    AtDefault,
    /// 已超时，已切回默认控制器
    Reverted,
}

/// 控制器仲裁器
pub struct ControllerArbiter<S> {
    controllers: ControllerSet,
    switcher: S,
    state: Mutex<ArbiterState>,
}

impl<S: ControllerSwitcher> ControllerArbiter<S> {
    /// 创建仲裁器
    ///
    /// 初始激活控制器为默认控制器，当前模式为默认控制器映射的模式。
    /// 默认控制器不在集合中时记录错误日志，但仍然创建仲裁器。
    pub fn new(controllers: ControllerSet, switcher: S, command_timeout: Duration) -> Self {
        controllers.validate();

        let current_controller = controllers.default_controller().to_string();
        let current_mode = controllers.mode_of(&current_controller);

        info!(
            default = %current_controller,
            timeout_ms = command_timeout.as_millis() as u64,
            "ControllerArbiter initialised"
        );

        Self {
            controllers,
            switcher,
            state: Mutex::new(ArbiterState {
                current_controller,
                current_mode,
                last_command: None,
                command_timeout: command_timeout
                    .min(Duration::from_secs_f64(MAX_COMMAND_TIMEOUT_SECS)),
            }),
        }
    }

    /// 按配置创建仲裁器
    pub fn from_config(config: &ArbiterConfig, switcher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            ControllerSet::from_config(config),
            switcher,
            config.command_timeout(),
        ))
    }

    /// 请求切换到 `code` 对应的模式
    ///
    /// - 与当前模式相同：不做任何操作，返回 `Ok(())`
    /// - 模式码未知或没有映射的控制器：返回错误，状态不变
    /// - 切换原语失败：返回 [`ArbiterError::SwitchFailed`]，状态不变
    ///
    /// 此方法不更新命令时间戳，命令回调请使用 [`handle_command`](Self::handle_command)。
    pub fn request_mode(&self, code: i32) -> Result<(), ArbiterError> {
        let mut state = self.state.lock();
        self.request_mode_locked(&mut state, code)
    }

    /// 命令回调：请求切换模式，成功时把命令时间戳更新为当前时间
    ///
    /// 时间戳在切换原语返回之后、仍持有锁时读取，切换本身的耗时不计入超时。
    pub fn handle_command(&self, code: i32) -> Result<(), ArbiterError> {
        self.handle_command_with(code, Instant::now)
    }

    /// 同 [`handle_command`](Self::handle_command)，用外部时钟的时刻作为时间戳
    ///
    /// 失败的命令不会刷新时间戳，看门狗只认可成功应用的命令。
    pub fn handle_command_at(&self, code: i32, now: Instant) -> Result<(), ArbiterError> {
        self.handle_command_with(code, || now)
    }

    fn handle_command_with(
        &self,
        code: i32,
        clock: impl FnOnce() -> Instant,
    ) -> Result<(), ArbiterError> {
        let mut state = self.state.lock();
        self.request_mode_locked(&mut state, code)?;
        state.last_command = Some(clock());
        Ok(())
    }

    /// 超时配置回调
    ///
    /// 输入被钳位到 `[0, 1]` 秒，在下一个看门狗周期生效。返回实际存储的值。
    pub fn set_command_timeout(&self, seconds: f64) -> Duration {
        let timeout = clamp_command_timeout(seconds);
        info!(
            requested = seconds,
            applied = timeout.as_secs_f64(),
            "Joint command timeout updated"
        );
        self.state.lock().command_timeout = timeout;
        timeout
    }

    /// 看门狗检查
    ///
    /// 距最近一次成功命令的时间超过超时值、且当前控制器不是默认控制器时，
    /// 强制切换到默认控制器。失败只记录日志，不自动重试（下一个周期会再次检查）。
    pub fn check_timeout(&self, now: Instant) -> Result<WatchdogOutcome, ArbiterError> {
        let mut state = self.state.lock();

        let Some(last_command) = state.last_command else {
            return Ok(WatchdogOutcome::NoCommandYet);
        };

        let elapsed = now.saturating_duration_since(last_command);
        if elapsed <= state.command_timeout {
            return Ok(WatchdogOutcome::Fresh);
        }

        if state.current_controller == self.controllers.default_controller() {
            return Ok(WatchdogOutcome::AtDefault);
        }

        warn!(
            elapsed_ms = elapsed.as_millis() as u64,
            default = %self.controllers.default_controller(),
            "Command timeout violated: switching to default controller"
        );
        self.switch_to_default_locked(&mut state)?;
        Ok(WatchdogOutcome::Reverted)
    }

    /// 无条件切换到默认控制器（停止其他所有控制器）
    pub fn switch_to_default(&self) -> Result<(), ArbiterError> {
        let mut state = self.state.lock();
        self.switch_to_default_locked(&mut state)
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> ArbiterSnapshot {
        let state = self.state.lock();
        ArbiterSnapshot {
            current_controller: state.current_controller.clone(),
            current_mode: state.current_mode,
            last_command: state.last_command,
            command_timeout: state.command_timeout,
        }
    }

    /// 当前模式
    pub fn current_mode(&self) -> Option<ControlMode> {
        self.state.lock().current_mode
    }

    /// 当前激活的控制器
    pub fn current_controller(&self) -> String {
        self.state.lock().current_controller.clone()
    }

    /// 控制器集合
    pub fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    fn request_mode_locked(&self, state: &mut ArbiterState, code: i32) -> Result<(), ArbiterError> {
        let mode = ControlMode::from_code(code).inspect_err(|_| {
            error!(code, "Unknown joint command mode. Ignoring command.");
        })?;

        if state.current_mode == Some(mode) {
            return Ok(());
        }

        let Some(entry) = self.controllers.controller_for(mode) else {
            error!(%mode, "No controller mapped to requested mode. Ignoring command.");
            return Err(ArbiterError::UnmappedMode(mode));
        };

        let start = entry.name.clone();
        self.switch_locked(state, start, Some(mode))
    }

    fn switch_to_default_locked(&self, state: &mut ArbiterState) -> Result<(), ArbiterError> {
        let default = self.controllers.default_controller();
        if !self.controllers.has_default() {
            error!(default, "Default controller not present in the provided controllers!");
            return Err(ArbiterError::DefaultControllerMissing(default.to_string()));
        }

        let mode = self.controllers.mode_of(default);
        self.switch_locked(state, default.to_string(), mode)
    }

    /// 调用切换原语，成功后才更新状态
    fn switch_locked(
        &self,
        state: &mut ArbiterState,
        start: String,
        mode: Option<ControlMode>,
    ) -> Result<(), ArbiterError> {
        let stop = self.controllers.stop_set_for(&start);

        let result = self.switcher.switch_controllers(
            std::slice::from_ref(&start),
            &stop,
            SwitchStrictness::BestEffort,
        );
        if let Err(source) = result {
            error!(%start, error = %source, "Failed to switch controllers");
            return Err(ArbiterError::SwitchFailed { start, source });
        }

        info!(
            started = %start,
            stopped = ?stop,
            "Controller started; other controllers stopped"
        );
        state.current_controller = start;
        state.current_mode = mode;
        Ok(())
    }
}
