//! 模拟运行命令
//!
//! 在进程内把仲裁器和阻抗控制器接到模拟硬件上：
//!
//! 1. 发送 TORQUE 命令，等待看门狗在命令过期后切回默认控制器
//! 2. 以固定频率运行阻抗控制周期，把末端拉向偏移后的目标位姿

use crate::sim::{LatchedTorque, LoggingSwitcher, SimulatedArm};
use anyhow::{Context, Result, bail};
use armctl::MotionCoreConfig;
use armctl::arbiter::{
    ArbiterCommand, ArbiterConfig, CommandDispatcher, ControlMode, ControllerArbiter, Watchdog,
    WatchdogConfig,
};
use armctl::impedance::{CartesianImpedanceController, ImpedanceConfig};
use armctl::math::{Vector3, Vector7};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 模拟运行参数
#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// 配置文件（省略时使用内置示例配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 阻抗控制周期数
    #[arg(long, default_value_t = 3000)]
    pub cycles: u64,

    /// 控制频率（Hz）
    #[arg(long, default_value_t = 1000.0)]
    pub rate: f64,

    /// 目标相对初始位置的偏移（米）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [0.05, 0.0, -0.03])]
    pub offset: Vec<f64>,

    /// 不按实时节拍睡眠，尽快运行
    #[arg(long)]
    pub fast: bool,

    /// 跳过仲裁器演示
    #[arg(long)]
    pub skip_arbiter: bool,
}

/// 内置示例阻抗配置
pub fn demo_impedance_config() -> ImpedanceConfig {
    ImpedanceConfig::new(
        "sim",
        (1..=7).map(|i| format!("sim_joint{i}")).collect(),
        vec![200.0, 200.0, 200.0, 10.0, 10.0, 10.0],
    )
}

impl SimulateCommand {
    /// 执行模拟
    pub fn execute(&self, running: Arc<AtomicBool>) -> Result<()> {
        let config = match &self.config {
            Some(path) => MotionCoreConfig::load_from_file(path)
                .with_context(|| format!("加载配置失败: {}", path.display()))?,
            None => MotionCoreConfig::default(),
        };

        if !(self.rate.is_finite() && self.rate > 0.0) {
            bail!("invalid control rate: {} Hz (must be > 0)", self.rate);
        }
        if self.offset.len() != 3 {
            bail!("offset needs exactly 3 values, got {}", self.offset.len());
        }

        if !self.skip_arbiter {
            run_arbiter(&config.arbiter)?;
        }

        let impedance = config.impedance.clone().unwrap_or_else(demo_impedance_config);
        let offset = Vector3::new(self.offset[0], self.offset[1], self.offset[2]);
        self.run_impedance(impedance, offset, &running)
    }

    fn run_impedance(
        &self,
        config: ImpedanceConfig,
        offset: Vector3<f64>,
        running: &AtomicBool,
    ) -> Result<()> {
        let mut arm = SimulatedArm::at(Vector3::new(0.3, 0.0, 0.5));
        let controller =
            CartesianImpedanceController::new(config).context("阻抗控制器初始化失败")?;
        let handle = controller.target_handle();
        let mut controller = controller.start(&arm);

        let start_pose = handle.snapshot();
        let goal = start_pose.position + offset;
        handle
            .set_equilibrium_pose(goal, *start_pose.orientation.quaternion())
            .context("设置目标位姿失败")?;

        println!(
            "🦾 阻抗控制: {} 个周期 @ {} Hz，目标 [{:.3}, {:.3}, {:.3}]",
            self.cycles, self.rate, goal.x, goal.y, goal.z
        );

        #[cfg(feature = "realtime")]
        set_realtime_priority();

        let period = Duration::from_secs_f64(1.0 / self.rate);
        let dt = period.as_secs_f64();
        let mut sink = LatchedTorque::default();
        let mut peak = Vector7::zeros();
        let mut overruns = 0u64;
        let mut next_tick = Instant::now() + period;

        for _ in 0..self.cycles {
            if !running.load(Ordering::Relaxed) {
                warn!("Interrupted; stopping impedance loop");
                break;
            }

            let tau = controller.update(&arm, &mut sink);
            peak = peak.zip_map(&tau, |p, t| p.max(t.abs()));
            arm.step(&tau, dt);

            if self.fast {
                continue;
            }
            // 睡眠到下一个锚点，超时时重置锚点
            let now = Instant::now();
            if next_tick > now {
                spin_sleep::sleep(next_tick - now);
                next_tick += period;
            } else {
                overruns += 1;
                next_tick = now + period;
            }
        }

        let error = (arm.position() - goal).norm();
        println!("   完成周期: {}", controller.cycles());
        println!("   末端位置误差: {:.6} m", error);
        println!("   最后一个周期力矩: {:?}", sink.tau.as_slice());
        println!("   各关节峰值力矩: {:?}", peak.as_slice());
        if overruns > 0 {
            println!("⚠️  周期超时 {} 次", overruns);
        }
        println!("✅ 模拟完成");
        Ok(())
    }
}

/// 发送 TORQUE 命令并等待看门狗回退
fn run_arbiter(config: &ArbiterConfig) -> Result<()> {
    let switcher = Arc::new(LoggingSwitcher::new(
        config.default_controller.clone(),
        Duration::from_millis(1),
    ));
    let arbiter = Arc::new(
        ControllerArbiter::from_config(config, switcher.clone()).context("仲裁器初始化失败")?,
    );
    let watchdog = Watchdog::start(arbiter.clone(), WatchdogConfig::from(config));
    let dispatcher =
        CommandDispatcher::spawn(arbiter.clone(), 16).context("启动命令分发线程失败")?;

    println!(
        "🔀 仲裁器: 默认控制器 {}，超时 {:.3}s",
        arbiter.controllers().default_controller(),
        config.command_timeout().as_secs_f64()
    );

    let Some(torque_controller) = arbiter
        .controllers()
        .controller_for(ControlMode::Torque)
        .map(|entry| entry.name.clone())
    else {
        bail!("no controller mapped to TORQUE");
    };

    dispatcher
        .send(ArbiterCommand::SetMode(ControlMode::Torque.code()))
        .context("发送模式命令失败")?;

    // 超时很短时看门狗可能先于轮询回退，以切换记录为准
    if !wait_until(Duration::from_secs(1), || switcher.has_started(&torque_controller)) {
        bail!("arbiter did not switch to TORQUE");
    }
    println!("   → TORQUE: {}", torque_controller);

    let revert_deadline = config.command_timeout() + Duration::from_secs(1);
    let reverted = wait_until(revert_deadline, || {
        arbiter.current_controller() == arbiter.controllers().default_controller()
    });

    dispatcher.shutdown();
    let reverts = watchdog.revert_count();
    watchdog.shutdown();

    if !reverted {
        bail!("watchdog did not revert to the default controller");
    }
    info!(reverts, "Watchdog reverted stale command");
    println!(
        "   ← 命令过期，回退到 {}（切换记录: {:?}）",
        arbiter.current_controller(),
        switcher.started()
    );
    Ok(())
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[cfg(feature = "realtime")]
fn set_realtime_priority() {
    use thread_priority::{ThreadPriority, set_current_thread_priority};

    match set_current_thread_priority(ThreadPriority::Max) {
        Ok(_) => info!("Control thread priority set to MAX (realtime)"),
        Err(e) => warn!(
            "Failed to set control thread priority: {:?}. \
             On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> SimulateCommand {
        SimulateCommand {
            config: None,
            cycles: 2000,
            rate: 1000.0,
            offset: vec![0.02, 0.0, 0.0],
            fast: true,
            skip_arbiter: true,
        }
    }

    #[test]
    fn test_demo_config_is_valid() {
        assert!(demo_impedance_config().validate().is_ok());
    }

    #[test]
    fn test_fast_simulation_runs() {
        let running = Arc::new(AtomicBool::new(true));
        assert!(command().execute(running).is_ok());
    }

    #[test]
    fn test_rejects_bad_rate() {
        let cmd = SimulateCommand {
            rate: 0.0,
            ..command()
        };
        assert!(cmd.execute(Arc::new(AtomicBool::new(true))).is_err());
    }

    #[test]
    fn test_arbiter_demo_zero_timeout() {
        let config = ArbiterConfig {
            command_timeout: 0.0,
            watchdog_period_ms: 1,
            ..Default::default()
        };
        assert!(run_arbiter(&config).is_ok());
    }

    #[test]
    fn test_arbiter_demo_reverts() {
        let config = ArbiterConfig {
            command_timeout: 0.05,
            ..Default::default()
        };
        assert!(run_arbiter(&config).is_ok());
    }
}
