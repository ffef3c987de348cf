//! 消息类型与端口常量定义
//!
//! 消息 ID 分段：
//! - `0x00-0x7F`: 客户端 → 机器人
//! - `0x80-0xFF`: 机器人 → 客户端（其中 `0x9x` 为周期性传感器流）

use num_enum::TryFromPrimitive;

/// 协议魔数（"LX" 的 ASCII 大端表示）
pub const WIRE_MAGIC: u16 = 0x4C58;

/// 当前协议版本
pub const WIRE_VERSION: u8 = 1;

/// 机器人侧监听端口（仿真与实机一致）
pub const ROBOT_PORT: u16 = 8001;

/// 仿真器默认地址
pub const DEFAULT_SIM_IP: &str = "127.0.0.1";

/// 消息类型枚举
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    // 客户端 → 机器人
    /// 心跳包（防止机器人侧会话超时回收）
    Heartbeat = 0x00,
    /// 连接请求
    Connect = 0x01,
    /// 断开请求
    Disconnect = 0x02,
    /// 全关节控制指令
    RobotCmd = 0x03,

    // 机器人 → 客户端
    /// 连接确认（携带 RobotInfo）
    ConnectAck = 0x81,

    // 周期性传感器流
    /// IMU 数据
    ImuData = 0x90,
    /// 机器人状态（q/dq/tau）
    RobotState = 0x91,
    /// 遥控器摇杆输入
    SensorJoy = 0x92,
    /// 诊断值
    DiagnosticValue = 0x93,
}

impl MessageType {
    /// 是否为机器人 → 客户端方向的报文
    pub fn is_feedback(self) -> bool {
        (self as u8) & 0x80 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_roundtrip() {
        for ty in [
            MessageType::Heartbeat,
            MessageType::Connect,
            MessageType::Disconnect,
            MessageType::RobotCmd,
            MessageType::ConnectAck,
            MessageType::ImuData,
            MessageType::RobotState,
            MessageType::SensorJoy,
            MessageType::DiagnosticValue,
        ] {
            assert_eq!(MessageType::try_from(ty as u8).unwrap(), ty);
        }
    }

    #[test]
    fn test_message_type_unknown() {
        assert!(MessageType::try_from(0x42u8).is_err());
        assert!(MessageType::try_from(0xFEu8).is_err());
    }

    #[test]
    fn test_feedback_direction() {
        assert!(!MessageType::Heartbeat.is_feedback());
        assert!(!MessageType::RobotCmd.is_feedback());
        assert!(MessageType::ConnectAck.is_feedback());
        assert!(MessageType::ImuData.is_feedback());
        assert!(MessageType::DiagnosticValue.is_feedback());
    }
}
