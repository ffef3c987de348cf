//! 驱动层错误类型定义

use humanoid_protocol::ProtocolError;
use humanoid_transport::TransportError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输层错误
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 指令通道已关闭（TX 线程退出）
    #[error("Command channel closed")]
    ChannelClosed,

    /// 指令通道已满（背压策略：拒绝最新指令）
    #[error("Command channel full (queue size: {capacity})")]
    ChannelFull { capacity: usize },
}
