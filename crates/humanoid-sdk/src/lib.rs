//! # Humanoid SDK
//!
//! 人形机器人低层控制 SDK 总入口。分层：
//!
//! - [`protocol`]: 数据报协议（无 I/O）
//! - [`transport`]: UDP / mock 传输
//! - [`driver`]: 后台 IO 线程与快照同步
//! - [`client`]: `Humanoid` 门面（大多数用户从这里开始）
//!
//! # 快速上手
//!
//! ```rust,no_run
//! use humanoid_sdk::prelude::*;
//!
//! fn main() -> Result<(), ClientError> {
//!     humanoid_sdk::init_logging();
//!
//!     let robot = Humanoid::instance();
//!     robot.subscribe_imu_data(|imu| {
//!         println!("quat: {:?}", imu.quat);
//!     });
//!     robot.init("127.0.0.1")?;
//!
//!     let mut cmd = RobotCmd::zeros(0);
//!     cmd.kp = [30.0; JOINT_COUNT];
//!     cmd.kd = [1.5; JOINT_COUNT];
//!     robot.publish_robot_cmd(cmd)?;
//!     Ok(())
//! }
//! ```

pub use humanoid_client as client;
pub use humanoid_driver as driver;
pub use humanoid_protocol as protocol;
pub use humanoid_transport as transport;

/// 常用类型一站式导入
pub mod prelude {
    pub use crate::client::{
        ClientConfig, ClientError, DiagnosticValueExt, Humanoid, SUBSYS_CALIBRATION,
        SUBSYS_CONNECTION, SUBSYS_ETHERCAT, SUBSYS_IMU,
    };
    pub use crate::protocol::{
        DiagnosticLevel, DiagnosticValue, ImuData, JOINT_COUNT, JOINT_NAMES, RobotCmd, RobotInfo,
        RobotState, SensorJoy, joint_index, joint_name,
    };
}

/// 初始化日志（`RUST_LOG` 可覆盖级别，默认 `info`）
///
/// 重复调用安全：第二次起为空操作。
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
