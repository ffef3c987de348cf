//! 客户端接口模块
//!
//! 本模块提供人形机器人 SDK 的用户门面：
//! - [`Humanoid`]: 进程级单例，init / 订阅 / 发布 / 快照一站式入口
//! - [`ClientConfig`]: 默认值 / TOML 两级配置
//! - [`diagnostics`]: 诊断通道的级别与子系统定义
//!
//! 需要直接控制传输或线程生命周期时使用 `humanoid-driver`。

pub mod config;
pub mod diagnostics;
mod humanoid;

pub use config::{ClientConfig, ConfigError};
pub use diagnostics::{
    DiagnosticValueExt, SUBSYS_CALIBRATION, SUBSYS_CONNECTION, SUBSYS_ETHERCAT, SUBSYS_IMU,
};
pub use humanoid::{ClientError, Humanoid};

// 数据形状来自协议层，门面使用者无需直接依赖 humanoid-protocol
pub use humanoid_protocol::{
    DiagnosticLevel, DiagnosticValue, ImuData, JOINT_COUNT, JOINT_NAMES, RobotCmd, RobotInfo,
    RobotState, SensorJoy,
};
