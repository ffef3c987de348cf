//! `info` 子命令：连接并打印机器人信息与关节表

use anyhow::{Context, Result};

use humanoid_sdk::prelude::*;

pub fn run_info(robot: &Humanoid, config: ClientConfig) -> Result<()> {
    let addr = config.robot_addr();
    robot
        .init_with_config(config)
        .with_context(|| format!("Failed to connect to {addr}"))?;

    let info = robot.robot_info().expect("connected");
    println!("机器人地址: {addr}");
    println!("固件版本:   {}", info.firmware);
    println!("电机数量:   {}", info.motor_count);
    println!();
    println!("关节表（状态/指令向量共用同一顺序）:");
    for (i, name) in robot.motor_names().iter().enumerate() {
        println!("  {i:>2}: {name}");
    }
    Ok(())
}
