//! 单关节正弦摆动示例
//!
//! 以 100Hz 向指定关节发送正弦位置指令（其余关节保持零位），
//! 演示指令发布通路与关节表查询。
//!
//! **安全提示**：仅在仿真器或吊装状态下运行，幅值默认很小。
//!
//! 使用方式：
//! ```bash
//! cargo run --example joint_wave -- --joint left_knee_joint --amplitude 0.2
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;

use humanoid_sdk::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "joint_wave")]
#[command(about = "单关节正弦摆动示例")]
struct Args {
    /// 机器人地址
    #[arg(long, default_value = "127.0.0.1")]
    robot_ip: String,

    /// 关节名（见 JOINT_NAMES）
    #[arg(long, default_value = "left_knee_joint")]
    joint: String,

    /// 摆动幅值（rad）
    #[arg(long, default_value = "0.1")]
    amplitude: f32,

    /// 摆动频率（Hz）
    #[arg(long, default_value = "0.5")]
    frequency: f32,
}

fn main() -> Result<(), ClientError> {
    humanoid_sdk::init_logging();
    let args = Args::parse();

    let Some(joint_idx) = joint_index(&args.joint) else {
        eprintln!("未知关节: {}（可用关节见 JOINT_NAMES）", args.joint);
        std::process::exit(1);
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
        .expect("Failed to set Ctrl+C handler");

    let robot = Humanoid::instance();
    robot.init(&args.robot_ip)?;
    println!("向 {} (idx {}) 发送正弦指令，Ctrl+C 停止", args.joint, joint_idx);

    let start = Instant::now();
    while running.load(Ordering::SeqCst) {
        let t = start.elapsed().as_secs_f32();
        let target =
            args.amplitude * (2.0 * std::f32::consts::PI * args.frequency * t).sin();

        let mut cmd = RobotCmd::zeros(0);
        cmd.q[joint_idx] = target;
        cmd.kp[joint_idx] = 60.0;
        cmd.kd[joint_idx] = 2.0;

        if let Err(e) = robot.publish_robot_cmd(cmd) {
            eprintln!("指令发布失败: {e}");
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    robot.shutdown();
    Ok(())
}
