//! 机器人实时监控工具
//!
//! 此示例演示如何连接到人形机器人（或仿真器）并实时监控反馈信息：
//! - 持续循环读取快照（1Hz 刷新频率）
//! - 显示 IMU 姿态、关节位置与驱动计数
//! - 诊断值通过订阅回调即时打印
//! - 支持 Ctrl+C 优雅退出
//!
//! **注意**：此示例只被动监听，不发送任何控制指令。
//!
//! 使用方式：
//! ```bash
//! # 连接本地仿真器
//! cargo run --example robot_monitor
//!
//! # 连接实机
//! cargo run --example robot_monitor -- --robot-ip 10.192.1.2
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;

use humanoid_sdk::prelude::*;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "robot_monitor")]
#[command(about = "人形机器人实时监控工具")]
struct Args {
    /// 机器人地址（仿真: 127.0.0.1，实机如 10.192.1.2）
    #[arg(long, default_value = "127.0.0.1")]
    robot_ip: String,
}

fn main() -> Result<(), ClientError> {
    humanoid_sdk::init_logging();
    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Failed to set Ctrl+C handler");

    let robot = Humanoid::instance();
    robot.subscribe_diagnostic_value(|diag| {
        if diag.needs_attention() {
            eprintln!("诊断: {}", diag.summary());
        }
    });

    robot.init(&args.robot_ip)?;
    let info = robot.robot_info().expect("connected");
    println!(
        "已连接 {} (固件 {}，电机 {} 个)",
        args.robot_ip, info.firmware, info.motor_count
    );

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_secs(1));

        match robot.imu() {
            Some(imu) => println!(
                "IMU  quat=[{:+.3} {:+.3} {:+.3} {:+.3}]  gyro=[{:+.2} {:+.2} {:+.2}]",
                imu.quat[0], imu.quat[1], imu.quat[2], imu.quat[3],
                imu.gyro[0], imu.gyro[1], imu.gyro[2],
            ),
            None => println!("IMU  (尚无数据)"),
        }

        if let Some(state) = robot.robot_state() {
            // 只打印腿部关节，避免刷屏
            print!("q    ");
            for (i, q) in state.q.iter().take(12).enumerate() {
                print!("{}={:+.2} ", joint_name(i).unwrap_or("?"), q);
            }
            println!();
        }

        let metrics = robot.metrics();
        println!(
            "链路 {}  rx={} tx={} 解码错误={} 丢弃指令={}",
            if robot.is_connected() { "在线" } else { "离线" },
            metrics.rx_datagrams,
            metrics.tx_datagrams,
            metrics.decode_errors,
            metrics.dropped_cmds,
        );
    }

    robot.shutdown();
    println!("已断开");
    Ok(())
}
