//! 数据报头编解码
//!
//! 每个 UDP 数据报由 8 字节报头加 payload 组成：
//!
//! ```text
//! +--------+--------+---------+----------+-------+-------------+
//! | magic  (u16)    | version | msg_type | seq (u16)           |
//! +--------+--------+---------+----------+-------+-------------+
//! | payload_len (u16)         | payload ...                    |
//! +---------------------------+--------------------------------+
//! ```
//!
//! 全部大端字节序。`payload_len` 必须与数据报实际剩余字节数一致，
//! 不一致的数据报整体拒收（UDP 不会截断并拼接，长度不符说明发送方异常）。

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::ids::{MessageType, WIRE_MAGIC, WIRE_VERSION};
use crate::{ProtocolError, need};

/// 报头长度（字节）
pub const HEADER_LEN: usize = 8;

/// payload 长度上限
///
/// 最大报文为 RobotCmd（8 + 31 + 31×4×5 = 659 字节），留出版本演进余量，
/// 同时保证整个数据报不超过常见以太网 MTU。
pub const MAX_PAYLOAD_LEN: usize = 1024;

/// 协议层与传输层之间的统一数据报抽象
///
/// `Datagram` 是前述两层的中间类型：传输层收发原始字节，
/// 协议层通过它拿到已校验的消息类型、序号与 payload。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// 消息类型
    pub msg_type: MessageType,
    /// 发送方递增序号（按方向独立计数，用于丢包观测）
    pub seq: u16,
    /// 消息 payload（可为空，如 Heartbeat）
    pub payload: Bytes,
}

impl Datagram {
    /// 构建数据报；payload 超限返回错误
    pub fn new(
        msg_type: MessageType,
        seq: u16,
        payload: impl Into<Bytes>,
    ) -> Result<Self, ProtocolError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::FieldTooLong {
                field: "payload",
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self {
            msg_type,
            seq,
            payload,
        })
    }

    /// 无 payload 数据报（Heartbeat / Connect / Disconnect）
    pub fn empty(msg_type: MessageType, seq: u16) -> Self {
        Self {
            msg_type,
            seq,
            payload: Bytes::new(),
        }
    }

    /// 编码为完整数据报字节串
    ///
    /// payload 超过 [`MAX_PAYLOAD_LEN`] 属于构造方错误（绕过 [`Datagram::new`]
    /// 直接填字段），`payload_len` 字段会发生截断，调试构建下直接断言。
    pub fn encode(&self) -> Bytes {
        debug_assert!(
            self.payload.len() <= MAX_PAYLOAD_LEN,
            "payload length {} exceeds MAX_PAYLOAD_LEN",
            self.payload.len()
        );
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_u16(WIRE_MAGIC);
        buf.put_u8(WIRE_VERSION);
        buf.put_u8(self.msg_type as u8);
        buf.put_u16(self.seq);
        buf.put_u16(self.payload.len() as u16);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// 从接收到的字节串解码
    pub fn decode(raw: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = raw;
        need(&buf, HEADER_LEN, "datagram header")?;

        let magic = buf.get_u16();
        if magic != WIRE_MAGIC {
            return Err(ProtocolError::BadMagic {
                expected: WIRE_MAGIC,
                found: magic,
            });
        }

        let version = buf.get_u8();
        if version != WIRE_VERSION {
            return Err(ProtocolError::UnsupportedVersion {
                found: version,
                supported: WIRE_VERSION,
            });
        }

        let type_byte = buf.get_u8();
        let msg_type = MessageType::try_from(type_byte)
            .map_err(|_| ProtocolError::UnknownMessageType { value: type_byte })?;

        let seq = buf.get_u16();
        let declared = buf.get_u16() as usize;
        if declared != buf.remaining() {
            return Err(ProtocolError::PayloadLengthMismatch {
                declared,
                actual: buf.remaining(),
            });
        }

        Ok(Self {
            msg_type,
            seq,
            payload: Bytes::copy_from_slice(buf),
        })
    }
}
