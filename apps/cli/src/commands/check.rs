//! 配置检查命令
//!
//! 加载并校验配置文件，打印控制器映射和阻抗参数摘要。

use anyhow::{Context, Result, bail};
use armctl::MotionCoreConfig;
use armctl::arbiter::ControllerSet;
use clap::Args;
use std::path::PathBuf;

/// 配置检查参数
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// 配置文件路径
    pub config: PathBuf,

    /// 默认控制器不在控制器集合中时视为错误
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    /// 执行检查
    pub fn execute(&self) -> Result<()> {
        let config = MotionCoreConfig::load_from_file(&self.config)
            .with_context(|| format!("加载配置失败: {}", self.config.display()))?;

        let controllers = ControllerSet::from_config(&config.arbiter);

        println!("📋 控制器映射:");
        for entry in controllers.entries() {
            let mode = entry
                .mode
                .map(|m| format!("{m} ({})", m.code()))
                .unwrap_or_else(|| "-".to_string());
            let marker = if entry.name == controllers.default_controller() {
                " [default]"
            } else {
                ""
            };
            println!("   {:<40} {}{}", entry.name, mode, marker);
        }
        println!(
            "⏱️  命令超时: {:.3}s（看门狗周期 {}ms）",
            config.arbiter.command_timeout().as_secs_f64(),
            config.arbiter.watchdog_period_ms
        );

        if !controllers.validate() {
            println!(
                "⚠️  默认控制器 '{}' 不在控制器集合中",
                controllers.default_controller()
            );
            if self.strict {
                bail!("default controller '{}' is not configured", controllers.default_controller());
            }
        }

        match &config.impedance {
            Some(impedance) => {
                println!("🦾 阻抗控制器: arm_id = {}", impedance.arm_id);
                println!("   刚度增益: {:?}", impedance.stiffness_gains);
                println!(
                    "   α = {}, Δτ_max = {} Nm, 阻尼系数 = {}",
                    impedance.filter_params, impedance.delta_tau_max, impedance.damping_scale
                );
            },
            None => println!("ℹ️  未配置 [impedance]"),
        }

        println!("✅ 配置有效");
        Ok(())
    }
}
