//! Watchdog - 命令超时看门狗线程
//!
//! 以固定周期（默认 100Hz）调用 [`ControllerArbiter::check_timeout`]，
//! 命令过期后把机械臂切回默认控制器。
//!
//! 周期按锚点累加（`next_tick += period`），单次检查变慢不会累积漂移；
//! 落后超过一个周期时重新对齐锚点，不补跑错过的周期。

use crate::arbiter::{ControllerArbiter, WatchdogOutcome};
use crate::config::{ArbiterConfig, DEFAULT_WATCHDOG_PERIOD_MS};
use crate::switcher::ControllerSwitcher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

/// 看门狗配置
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// 检查周期
    pub period: Duration,
    /// 是否启用（默认启用）
    pub enabled: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        WatchdogConfig {
            period: Duration::from_millis(DEFAULT_WATCHDOG_PERIOD_MS),
            enabled: true,
        }
    }
}

impl From<&ArbiterConfig> for WatchdogConfig {
    fn from(config: &ArbiterConfig) -> Self {
        WatchdogConfig {
            period: config.watchdog_period(),
            enabled: true,
        }
    }
}

/// 看门狗
///
/// 持有后台线程，`shutdown()` 或 drop 时停止并等待线程退出。
pub struct Watchdog {
    handle: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    reverts: Arc<AtomicU64>,
}

impl Watchdog {
    /// 启动看门狗线程
    pub fn start<S>(arbiter: Arc<ControllerArbiter<S>>, config: WatchdogConfig) -> Self
    where
        S: ControllerSwitcher + 'static,
    {
        let reverts = Arc::new(AtomicU64::new(0));

        if !config.enabled || config.period.is_zero() {
            debug!("Watchdog disabled");
            return Watchdog {
                handle: None,
                shutdown: Arc::new(AtomicBool::new(true)),
                reverts,
            };
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let reverts_clone = reverts.clone();

        let spawned = thread::Builder::new()
            .name("armctl-watchdog".to_string())
            .spawn(move || {
                Self::watchdog_loop(arbiter, config.period, shutdown_clone, reverts_clone);
            });

        match spawned {
            Ok(handle) => Watchdog {
                handle: Some(handle),
                shutdown,
                reverts,
            },
            Err(e) => {
                error!(error = %e, "Failed to spawn watchdog thread");
                shutdown.store(true, Ordering::Relaxed);
                Watchdog {
                    handle: None,
                    shutdown,
                    reverts,
                }
            },
        }
    }

    fn watchdog_loop<S: ControllerSwitcher>(
        arbiter: Arc<ControllerArbiter<S>>,
        period: Duration,
        shutdown: Arc<AtomicBool>,
        reverts: Arc<AtomicU64>,
    ) {
        debug!(period_ms = period.as_millis() as u64, "Watchdog thread started");
        let mut next_tick = Instant::now() + period;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            }
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // 失败已在仲裁器中记录，下一个周期会再次尝试
            match arbiter.check_timeout(Instant::now()) {
                Ok(WatchdogOutcome::Reverted) => {
                    reverts.fetch_add(1, Ordering::Relaxed);
                },
                Ok(outcome) => trace!(?outcome, "Watchdog tick"),
                Err(e) => trace!(error = %e, "Watchdog revert failed"),
            }

            next_tick += period;
            let now = Instant::now();
            if now > next_tick + period {
                next_tick = now + period;
            }
        }

        debug!("Watchdog thread stopped");
    }

    /// 已触发的回退次数
    pub fn revert_count(&self) -> u64 {
        self.reverts.load(Ordering::Relaxed)
    }

    /// 看门狗线程是否在运行（已关闭或线程已退出时为 `false`）
    pub fn is_running(&self) -> bool {
        !self.shutdown.load(Ordering::Relaxed)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 优雅关闭看门狗线程
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Watchdog thread panicked");
            }
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
