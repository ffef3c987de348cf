//! `monitor` 子命令：实时打印传感器快照与诊断流

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use humanoid_sdk::prelude::*;

use super::install_ctrlc;

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// 刷新周期（毫秒）
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// 运行时长（秒，0 表示直到 Ctrl+C）
    #[arg(long, default_value = "0")]
    seconds: u64,
}

pub fn run_monitor(robot: &Humanoid, config: ClientConfig, args: MonitorArgs) -> Result<()> {
    let running = install_ctrlc()?;

    robot.subscribe_diagnostic_value(|diag| {
        if diag.needs_attention() {
            eprintln!("诊断: {}", diag.summary());
        }
    });

    let addr = config.robot_addr();
    robot
        .init_with_config(config)
        .with_context(|| format!("Failed to connect to {addr}"))?;
    println!("已连接 {addr}，Ctrl+C 退出");

    let deadline = (args.seconds > 0).then(|| {
        std::time::Instant::now() + Duration::from_secs(args.seconds)
    });

    while running.load(Ordering::SeqCst) {
        if let Some(deadline) = deadline {
            if std::time::Instant::now() >= deadline {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(args.interval_ms));

        match robot.imu() {
            Some(imu) => println!(
                "IMU  stamp={}ns  quat=[{:+.3} {:+.3} {:+.3} {:+.3}]",
                imu.stamp_ns, imu.quat[0], imu.quat[1], imu.quat[2], imu.quat[3],
            ),
            None => println!("IMU  (尚无数据)"),
        }

        if let Some(joy) = robot.sensor_joy() {
            println!("JOY  axes={:?} buttons={:?}", joy.axes, joy.buttons);
        }

        let m = robot.metrics();
        println!(
            "链路 {}  rx={} tx={} 解码错误={}",
            if robot.is_connected() { "在线" } else { "离线" },
            m.rx_datagrams,
            m.tx_datagrams,
            m.decode_errors,
        );
    }
    Ok(())
}
