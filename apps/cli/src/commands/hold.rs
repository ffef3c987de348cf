//! `hold` 子命令：位置保持
//!
//! 等待第一帧机器人状态，以其关节位置为目标持续下发保持指令。
//! 适合在调试增益或验证链路时让机器人维持当前姿态。

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;

use humanoid_sdk::prelude::*;

use super::install_ctrlc;

#[derive(Args, Debug)]
pub struct HoldArgs {
    /// 统一位置增益
    #[arg(long, default_value = "60.0")]
    kp: f32,

    /// 统一速度增益
    #[arg(long, default_value = "2.0")]
    kd: f32,

    /// 指令频率（Hz）
    #[arg(long, default_value = "100")]
    rate: u32,
}

pub fn run_hold(robot: &Humanoid, config: ClientConfig, args: HoldArgs) -> Result<()> {
    if args.rate == 0 || args.rate > 1000 {
        bail!("rate must be within 1..=1000 Hz");
    }
    let running = install_ctrlc()?;

    let addr = config.robot_addr();
    robot
        .init_with_config(config)
        .with_context(|| format!("Failed to connect to {addr}"))?;

    // 等待第一帧状态作为保持目标
    let deadline = Instant::now() + Duration::from_secs(3);
    let target = loop {
        if let Some(state) = robot.robot_state() {
            break state.q;
        }
        if Instant::now() >= deadline {
            bail!("No robot state received within 3s, cannot hold");
        }
        std::thread::sleep(Duration::from_millis(20));
    };

    println!(
        "保持当前姿态 (kp={}, kd={}, {}Hz)，Ctrl+C 退出",
        args.kp, args.kd, args.rate
    );

    let period = Duration::from_secs_f64(1.0 / args.rate as f64);
    let mut dropped: u64 = 0;
    while running.load(Ordering::SeqCst) {
        let cmd = RobotCmd::hold(0, &target, args.kp, args.kd);
        if robot.publish_robot_cmd(cmd).is_err() {
            dropped += 1;
        }
        std::thread::sleep(period);
    }

    if dropped > 0 {
        eprintln!("有 {dropped} 条指令未能入队");
    }
    Ok(())
}
