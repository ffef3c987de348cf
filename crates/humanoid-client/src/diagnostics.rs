//! 诊断通道辅助定义
//!
//! 机器人通过诊断流上报各子系统的状态三元组
//! （名称、级别、状态码、消息），例如：
//!
//! | name        | level | code | msg                              |
//! |-------------|-------|------|----------------------------------|
//! | imu         | Ok    | 0    | IMU is functioning properly.     |
//! | imu         | Error | -1   | Error in IMU.                    |
//! | ethercat    | Ok    | 0    | EtherCAT is working fine.        |
//! | ethercat    | Error | -1   | EtherCAT error.                  |
//! | calibration | Ok    | 0    | Robot calibration successful.    |
//! | calibration | Warn  | 1    | Robot calibration in progress.   |
//! | calibration | Error | -1   | Robot calibration failed.        |
//!
//! 此外客户端本地会合成 `connection` 子系统的诊断（链路丢失/恢复），
//! 与机器人下发的诊断走同一订阅通路。

pub use humanoid_protocol::{DiagnosticLevel, DiagnosticValue};

/// IMU 子系统名
pub const SUBSYS_IMU: &str = "imu";
/// EtherCAT 总线子系统名
pub const SUBSYS_ETHERCAT: &str = "ethercat";
/// 标定子系统名
pub const SUBSYS_CALIBRATION: &str = "calibration";
/// 客户端合成的链路诊断名
pub const SUBSYS_CONNECTION: &str = "connection";

/// 诊断值的便捷判断
pub trait DiagnosticValueExt {
    /// 级别为 Error
    fn is_error(&self) -> bool;
    /// 级别为 Warn 或 Error
    fn needs_attention(&self) -> bool;
    /// 单行摘要（用于日志）
    fn summary(&self) -> String;
}

impl DiagnosticValueExt for DiagnosticValue {
    fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    fn needs_attention(&self) -> bool {
        self.level != DiagnosticLevel::Ok
    }

    fn summary(&self) -> String {
        format!(
            "[{:?}] {} (code {}): {}",
            self.level, self.name, self.code, self.message
        )
    }
}
