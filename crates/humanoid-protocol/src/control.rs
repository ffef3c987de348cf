//! 控制报文构建（客户端 → 机器人）
//!
//! 目前唯一携带 payload 的控制报文是 [`RobotCmd`]。
//! Heartbeat / Connect / Disconnect 均为空 payload，直接用
//! [`crate::wire::Datagram::empty`] 构建。

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::joints::JOINT_COUNT;
use crate::{ProtocolError, need};

/// RobotCmd payload 固定长度（stamp + mode[31] + q/dq/tau/kp/kd 各 31 个 f32）
pub const ROBOT_CMD_PAYLOAD_LEN: usize = 8 + JOINT_COUNT + JOINT_COUNT * 4 * 5;

/// 全关节控制指令
///
/// 关节顺序见 [`crate::joints`]：下标 *i* 与
/// [`crate::feedback::RobotState`] 中的下标 *i* 指向同一个物理关节。
///
/// 每个关节执行 `tau + kp * (q_des - q) + kd * (dq_des - dq)` 的
/// 前馈 + PD 混合控制；`mode` 为固件侧保留的每关节模式字节。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotCmd {
    /// 指令时间戳（纳秒，客户端侧时钟）
    pub stamp_ns: u64,
    /// 每关节模式字节（固件保留，默认 0）
    pub mode: [u8; JOINT_COUNT],
    /// 目标位置（rad）
    pub q: [f32; JOINT_COUNT],
    /// 目标速度（rad/s）
    pub dq: [f32; JOINT_COUNT],
    /// 前馈力矩（N·m）
    pub tau: [f32; JOINT_COUNT],
    /// 位置增益
    pub kp: [f32; JOINT_COUNT],
    /// 速度增益
    pub kd: [f32; JOINT_COUNT],
}

impl Default for RobotCmd {
    fn default() -> Self {
        Self {
            stamp_ns: 0,
            mode: [0; JOINT_COUNT],
            q: [0.0; JOINT_COUNT],
            dq: [0.0; JOINT_COUNT],
            tau: [0.0; JOINT_COUNT],
            kp: [0.0; JOINT_COUNT],
            kd: [0.0; JOINT_COUNT],
        }
    }
}

impl RobotCmd {
    /// 全零指令（所有增益为 0，机器人不产生输出）
    pub fn zeros(stamp_ns: u64) -> Self {
        Self {
            stamp_ns,
            ..Self::default()
        }
    }

    /// 位置保持指令：目标位置取当前反馈，统一增益
    pub fn hold(stamp_ns: u64, q: &[f32; JOINT_COUNT], kp: f32, kd: f32) -> Self {
        Self {
            stamp_ns,
            q: *q,
            kp: [kp; JOINT_COUNT],
            kd: [kd; JOINT_COUNT],
            ..Self::default()
        }
    }

    pub fn encode_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(ROBOT_CMD_PAYLOAD_LEN);
        buf.put_u64(self.stamp_ns);
        buf.put_slice(&self.mode);
        for arr in [&self.q, &self.dq, &self.tau, &self.kp, &self.kd] {
            for &v in arr.iter() {
                buf.put_f32(v);
            }
        }
        buf.freeze()
    }

    pub fn decode_payload(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        need(&buf, ROBOT_CMD_PAYLOAD_LEN, "RobotCmd payload")?;
        let stamp_ns = buf.get_u64();
        let mut cmd = Self {
            stamp_ns,
            ..Self::default()
        };
        buf.copy_to_slice(&mut cmd.mode);
        for arr in [
            &mut cmd.q,
            &mut cmd.dq,
            &mut cmd.tau,
            &mut cmd.kp,
            &mut cmd.kd,
        ] {
            for v in arr.iter_mut() {
                *v = buf.get_f32();
            }
        }
        Ok(cmd)
    }
}
