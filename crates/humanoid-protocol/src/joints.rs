//! 31 关节命名与索引表
//!
//! 状态反馈（[`crate::feedback::RobotState`]）与控制指令
//! （[`crate::control::RobotCmd`]）共用同一套关节顺序：
//! 向量下标 *i* 在两个方向上指向同一个物理关节。
//!
//! 顺序约定（固件侧约定，不可变更）：
//! - `0..=5`:   左腿（髋 pitch/roll/yaw、膝、踝 pitch/roll）
//! - `6..=11`:  右腿（同左腿顺序）
//! - `12..=14`: 腰（yaw/roll/pitch）
//! - `15..=16`: 头（pitch/yaw）
//! - `17..=23`: 左臂（肩 pitch/roll/yaw、肘、腕 yaw/roll/pitch）
//! - `24..=30`: 右臂（同左臂顺序）

/// 关节总数
pub const JOINT_COUNT: usize = 31;

/// 关节名称表（下标即电机序号）
pub const JOINT_NAMES: [&str; JOINT_COUNT] = [
    // 左腿
    "left_hip_pitch_joint",
    "left_hip_roll_joint",
    "left_hip_yaw_joint",
    "left_knee_joint",
    "left_ankle_pitch_joint",
    "left_ankle_roll_joint",
    // 右腿
    "right_hip_pitch_joint",
    "right_hip_roll_joint",
    "right_hip_yaw_joint",
    "right_knee_joint",
    "right_ankle_pitch_joint",
    "right_ankle_roll_joint",
    // 腰
    "waist_yaw_joint",
    "waist_roll_joint",
    "waist_pitch_joint",
    // 头
    "head_pitch_joint",
    "head_yaw_joint",
    // 左臂
    "left_shoulder_pitch_joint",
    "left_shoulder_roll_joint",
    "left_shoulder_yaw_joint",
    "left_elbow_joint",
    "left_hand_yaw_joint",
    "left_hand_roll_joint",
    "left_hand_pitch_joint",
    // 右臂
    "right_shoulder_pitch_joint",
    "right_shoulder_roll_joint",
    "right_shoulder_yaw_joint",
    "right_elbow_joint",
    "right_hand_yaw_joint",
    "right_hand_roll_joint",
    "right_hand_pitch_joint",
];

/// 按序号查关节名；越界返回 `None`
pub fn joint_name(index: usize) -> Option<&'static str> {
    JOINT_NAMES.get(index).copied()
}

/// 按名称查序号；未知名称返回 `None`
pub fn joint_index(name: &str) -> Option<usize> {
    JOINT_NAMES.iter().position(|&n| n == name)
}
