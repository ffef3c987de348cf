//! 传输层抽象
//!
//! 本模块提供数据报传输的统一接口，将上层（driver）与具体收发通道解耦：
//! - `udp`: 实机/仿真器使用的 UDP 链路
//! - `mock`: 测试用内存队列（`mock` feature）
//!
//! 传输层只负责字节搬运，不理解报文内容；编解码在
//! `humanoid-protocol` 中完成。

pub mod udp;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use udp::UdpLink;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

use thiserror::Error;

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    /// 读超时（正常情况，RX 循环以此轮询退出标志）
    #[error("Read timeout")]
    Timeout,

    /// 链路已关闭
    #[error("Transport closed")]
    Closed,

    /// 底层 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 数据报传输接口
///
/// 所有方法使用 `&self`：实现必须自含同步（UDP socket 本身线程安全，
/// mock 用内部锁），以便 RX / TX / 心跳线程共享同一个传输实例。
pub trait Transport: Send + Sync {
    /// 发送一个完整数据报
    fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// 接收一个数据报到 `buf`，返回有效长度
    ///
    /// 无数据时在实现自定义的超时后返回 [`TransportError::Timeout`]，
    /// 调用侧据此轮询退出标志，禁止无限阻塞。
    fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// 链路描述（仅用于日志）
    fn describe(&self) -> String;
}
