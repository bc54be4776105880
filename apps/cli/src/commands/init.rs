//! 生成默认配置文件

use super::simulate::demo_impedance_config;
use anyhow::{Context, Result, bail};
use armctl::MotionCoreConfig;
use clap::Args;
use std::path::PathBuf;

/// 配置生成参数
#[derive(Args, Debug)]
pub struct InitCommand {
    /// 输出路径
    #[arg(default_value = "armctl.toml")]
    pub output: PathBuf,

    /// 覆盖已存在的文件
    #[arg(short, long)]
    pub force: bool,

    /// 不生成 [impedance] 段
    #[arg(long)]
    pub no_impedance: bool,
}

impl InitCommand {
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        let config = MotionCoreConfig {
            impedance: (!self.no_impedance).then(demo_impedance_config),
            ..Default::default()
        };
        config
            .save_to_file(&self.output)
            .with_context(|| format!("写入配置失败: {}", self.output.display()))?;

        println!("✅ 已生成配置: {}", self.output.display());
        Ok(())
    }
}
