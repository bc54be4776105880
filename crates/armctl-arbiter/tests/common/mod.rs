//! Mock 控制器管理器
//!
//! 记录每一次切换请求，并可模拟切换失败和切换耗时。

#![allow(dead_code)]

use armctl_arbiter::{ControllerSwitcher, SwitchError, SwitchStrictness};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 一次切换调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCall {
    pub start: Vec<String>,
    pub stop: Vec<String>,
    pub strictness: SwitchStrictness,
}

/// 记录调用的切换原语
#[derive(Default)]
pub struct RecordingSwitcher {
    calls: Mutex<Vec<SwitchCall>>,
    fail: AtomicBool,
    latency: Mutex<Duration>,
}

impl RecordingSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的切换是否失败
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// 每次切换前睡眠的时间
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn calls(&self) -> Vec<SwitchCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// 最近一次成功或失败调用中启动的控制器
    pub fn last_started(&self) -> Option<String> {
        self.calls
            .lock()
            .last()
            .and_then(|c| c.start.first().cloned())
    }
}

impl ControllerSwitcher for RecordingSwitcher {
    fn switch_controllers(
        &self,
        start: &[String],
        stop: &[String],
        strictness: SwitchStrictness,
    ) -> Result<(), SwitchError> {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        self.calls.lock().push(SwitchCall {
            start: start.to_vec(),
            stop: stop.to_vec(),
            strictness,
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(SwitchError::Unavailable("mock controller manager".to_string()));
        }
        Ok(())
    }
}
