//! # Humanoid CLI
//!
//! 人形机器人低层 SDK 的命令行工具（One-shot 模式：连接 → 执行 → 断开）。
//!
//! ```bash
//! # 查看机器人信息与关节表
//! humanoid-cli info --robot-ip 10.192.1.2
//!
//! # 实时监控（Ctrl+C 退出）
//! humanoid-cli monitor
//!
//! # 位置保持（抓取当前姿态后持续下发保持指令）
//! humanoid-cli hold --kp 80 --kd 2.5 --rate 200
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

use humanoid_sdk::prelude::*;

mod commands;

use commands::{hold::HoldArgs, info::run_info, monitor::MonitorArgs};

/// Humanoid CLI - 人形机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "humanoid-cli")]
#[command(about = "Command-line interface for humanoid robot low-level control", long_about = None)]
#[command(version)]
struct Cli {
    /// 机器人地址（覆盖配置文件）
    #[arg(long, global = true)]
    robot_ip: Option<String>,

    /// TOML 配置文件路径
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 查询机器人信息与关节表
    Info,

    /// 实时监控传感器与诊断流
    Monitor(MonitorArgs),

    /// 位置保持（持续下发当前姿态的保持指令）
    Hold(HoldArgs),
}

fn main() -> Result<()> {
    humanoid_sdk::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(ip) = &cli.robot_ip {
        config.robot_ip = ip.clone();
    }

    let robot = Humanoid::instance();
    let result = match cli.command {
        Commands::Info => run_info(robot, config),
        Commands::Monitor(args) => commands::monitor::run_monitor(robot, config, args),
        Commands::Hold(args) => commands::hold::run_hold(robot, config, args),
    };
    robot.shutdown();
    result
}
