//! # armctl CLI
//!
//! 运动控制核心的命令行工具，不连接真实硬件。
//!
//! ```bash
//! # 生成默认配置
//! armctl-cli init armctl.toml
//!
//! # 检查配置
//! armctl-cli check armctl.toml --strict
//!
//! # 在模拟机械臂上运行仲裁器和阻抗控制器
//! armctl-cli simulate --config armctl.toml --cycles 5000 --offset 0.05,0,-0.03
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

mod commands;
mod sim;

use commands::{CheckCommand, InitCommand, SimulateCommand};

/// armctl CLI - 运动控制核心命令行工具
#[derive(Parser, Debug)]
#[command(name = "armctl-cli")]
#[command(about = "Command-line tools for the armctl motion-control core", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 生成默认配置文件
    Init {
        #[command(flatten)]
        args: InitCommand,
    },

    /// 加载并检查配置文件
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 在模拟机械臂上运行控制栈
    Simulate {
        #[command(flatten)]
        args: SimulateCommand,
    },
}

fn main() -> Result<()> {
    armctl::logging::init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { args } => args.execute(),

        Commands::Check { args } => args.execute(),

        Commands::Simulate { args } => {
            let running = Arc::new(AtomicBool::new(true));
            let flag = running.clone();
            ctrlc::set_handler(move || {
                warn!("Ctrl-C received, stopping");
                flag.store(false, Ordering::Relaxed);
            })?;
            args.execute(running)
        },
    }
}
