//! # Humanoid Protocol
//!
//! 人形机器人 UDP 数据报协议定义（无 I/O 依赖）
//!
//! ## 模块
//!
//! - `ids`: 消息类型与端口常量定义
//! - `joints`: 31 关节命名与索引表
//! - `wire`: 数据报头编解码
//! - `feedback`: 机器人 → 客户端反馈报文解析
//! - `control`: 客户端 → 机器人控制报文构建
//!
//! ## 字节序
//!
//! 协议全部使用大端字节序（网络字节序）。
//! 标量一律为 `f32`，与机器人固件侧的数据精度一致。

pub mod control;
pub mod feedback;
pub mod ids;
pub mod joints;
pub mod wire;

// 重新导出常用类型
pub use control::*;
pub use feedback::*;
pub use ids::*;
pub use joints::*;
pub use wire::*;

use bytes::Buf;
use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Bad magic: expected 0x{expected:04X}, got 0x{found:04X}")]
    BadMagic { expected: u16, found: u16 },

    #[error("Unsupported protocol version: {found} (supported: {supported})")]
    UnsupportedVersion { found: u8, supported: u8 },

    #[error("Unknown message type: 0x{value:02X}")]
    UnknownMessageType { value: u8 },

    #[error("Truncated {what}: need {expected} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: u32 },

    #[error("Field {field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Payload length mismatch: header says {declared}, datagram has {actual}")]
    PayloadLengthMismatch { declared: usize, actual: usize },
}

/// 读取前检查剩余字节数，避免 `Buf::get_*` panic
pub(crate) fn need(buf: &impl Buf, n: usize, what: &'static str) -> Result<(), ProtocolError> {
    if buf.remaining() < n {
        return Err(ProtocolError::Truncated {
            what,
            expected: n,
            actual: buf.remaining(),
        });
    }
    Ok(())
}
