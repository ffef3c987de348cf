//! 驱动层共享状态
//!
//! RX 线程收到一帧即整体替换对应的快照（Frame Commit），
//! 读取侧通过 `ArcSwapOption` 做 wait-free 读取，不存在半更新状态。

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use humanoid_protocol::{DiagnosticValue, ImuData, RobotState, SensorJoy};

/// 最新一次收到的各类传感器快照
///
/// 建立连接之前所有快照为 `None`。
#[derive(Default)]
pub struct SharedState {
    imu: ArcSwapOption<ImuData>,
    robot_state: ArcSwapOption<RobotState>,
    joy: ArcSwapOption<SensorJoy>,
    diagnostic: ArcSwapOption<DiagnosticValue>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最新 IMU 数据
    pub fn imu(&self) -> Option<Arc<ImuData>> {
        self.imu.load_full()
    }

    /// 最新机器人状态
    pub fn robot_state(&self) -> Option<Arc<RobotState>> {
        self.robot_state.load_full()
    }

    /// 最新摇杆输入
    pub fn sensor_joy(&self) -> Option<Arc<SensorJoy>> {
        self.joy.load_full()
    }

    /// 最新诊断值（任意子系统，仅保留最后一条）
    pub fn diagnostic(&self) -> Option<Arc<DiagnosticValue>> {
        self.diagnostic.load_full()
    }

    pub(crate) fn commit_imu(&self, data: Arc<ImuData>) {
        self.imu.store(Some(data));
    }

    pub(crate) fn commit_robot_state(&self, data: Arc<RobotState>) {
        self.robot_state.store(Some(data));
    }

    pub(crate) fn commit_joy(&self, data: Arc<SensorJoy>) {
        self.joy.store(Some(data));
    }

    pub(crate) fn commit_diagnostic(&self, data: Arc<DiagnosticValue>) {
        self.diagnostic.store(Some(data));
    }
}
