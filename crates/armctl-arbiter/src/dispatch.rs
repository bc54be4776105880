//! 命令分发线程
//!
//! 把关节命令和超时配置从通信回调中解耦：回调只做 `try_send`，
//! 由单独的分发线程按到达顺序调用仲裁器。

use crate::arbiter::ControllerArbiter;
use crate::error::DispatchError;
use crate::switcher::ControllerSwitcher;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// 分发线程检查关闭标志的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 仲裁器命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArbiterCommand {
    /// 关节命令中的模式码
    SetMode(i32),
    /// 新的命令超时（秒，未钳位）
    SetTimeout(f64),
}

/// 命令发送端（可克隆，可跨线程）
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<(ArbiterCommand, Instant)>,
}

impl CommandSender {
    /// 非阻塞发送，入队时刻只用于记录排队延迟
    pub fn send(&self, command: ArbiterCommand) -> Result<(), DispatchError> {
        self.tx
            .try_send((command, Instant::now()))
            .map_err(|e| match e {
                TrySendError::Full(_) => DispatchError::QueueFull,
                TrySendError::Disconnected(_) => DispatchError::Closed,
            })
    }
}

/// 命令分发器
pub struct CommandDispatcher {
    sender: CommandSender,
    handle: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl CommandDispatcher {
    /// 启动分发线程
    ///
    /// `capacity` 为有界队列容量（至少为 1）。
    pub fn spawn<S>(arbiter: Arc<ControllerArbiter<S>>, capacity: usize) -> Result<Self, std::io::Error>
    where
        S: ControllerSwitcher + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("armctl-dispatch".to_string())
            .spawn(move || Self::dispatch_loop(arbiter, rx, shutdown_clone))?;

        Ok(CommandDispatcher {
            sender: CommandSender { tx },
            handle: Some(handle),
            shutdown,
        })
    }

    fn dispatch_loop<S: ControllerSwitcher>(
        arbiter: Arc<ControllerArbiter<S>>,
        rx: Receiver<(ArbiterCommand, Instant)>,
        shutdown: Arc<AtomicBool>,
    ) {
        debug!("Command dispatcher started");

        while !shutdown.load(Ordering::Relaxed) {
            let (command, received_at) = match rx.recv_timeout(POLL_INTERVAL) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            match command {
                ArbiterCommand::SetMode(code) => {
                    debug!(
                        code,
                        queued_us = received_at.elapsed().as_micros() as u64,
                        "Dispatching joint command"
                    );
                    // 错误已由仲裁器记录
                    if let Err(e) = arbiter.handle_command(code) {
                        if e.is_retryable() {
                            warn!(code, error = %e, "Joint command not applied");
                        } else {
                            debug!(code, error = %e, "Joint command ignored");
                        }
                    }
                },
                ArbiterCommand::SetTimeout(seconds) => {
                    arbiter.set_command_timeout(seconds);
                },
            }
        }

        debug!("Command dispatcher stopped");
    }

    /// 获取发送端
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// 直接发送命令
    pub fn send(&self, command: ArbiterCommand) -> Result<(), DispatchError> {
        self.sender.send(command)
    }

    /// 停止分发线程（队列中未处理的命令被丢弃）
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Command dispatcher thread panicked");
            }
        }
    }
}

impl Drop for CommandDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
