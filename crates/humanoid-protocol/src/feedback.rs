//! 反馈报文解析（机器人 → 客户端）
//!
//! 每种报文提供 `encode_payload` / `decode_payload` 一对方法。
//! 客户端只使用 decode 方向；encode 方向供仿真器、mock 与测试使用。

use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_enum::TryFromPrimitive;

use crate::joints::JOINT_COUNT;
use crate::{ProtocolError, need};

/// IMU payload 固定长度（stamp + quat[4] + gyro[3] + acc[3]）
pub const IMU_PAYLOAD_LEN: usize = 8 + 10 * 4;

/// RobotState payload 固定长度（stamp + q/dq/tau 各 31 个 f32）
pub const ROBOT_STATE_PAYLOAD_LEN: usize = 8 + JOINT_COUNT * 4 * 3;

/// 字符串字段长度上限
const MAX_STRING_LEN: usize = 255;

/// 摇杆轴/按键数量上限
const MAX_JOY_CHANNELS: usize = 32;

/// IMU 数据
///
/// 坐标系为机器人基座系，四元数为 (w, x, y, z) 顺序。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImuData {
    /// 采样时间戳（纳秒，机器人侧单调时钟）
    pub stamp_ns: u64,
    /// 姿态四元数 (w, x, y, z)
    pub quat: [f32; 4],
    /// 角速度（rad/s）
    pub gyro: [f32; 3],
    /// 线加速度（m/s²）
    pub acc: [f32; 3],
}

impl ImuData {
    pub fn encode_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(IMU_PAYLOAD_LEN);
        buf.put_u64(self.stamp_ns);
        for v in self.quat {
            buf.put_f32(v);
        }
        for v in self.gyro {
            buf.put_f32(v);
        }
        for v in self.acc {
            buf.put_f32(v);
        }
        buf.freeze()
    }

    pub fn decode_payload(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        need(&buf, IMU_PAYLOAD_LEN, "ImuData payload")?;
        let stamp_ns = buf.get_u64();
        let mut quat = [0.0f32; 4];
        for v in &mut quat {
            *v = buf.get_f32();
        }
        let mut gyro = [0.0f32; 3];
        for v in &mut gyro {
            *v = buf.get_f32();
        }
        let mut acc = [0.0f32; 3];
        for v in &mut acc {
            *v = buf.get_f32();
        }
        Ok(Self {
            stamp_ns,
            quat,
            gyro,
            acc,
        })
    }
}

/// 机器人状态（全关节反馈）
///
/// 关节顺序见 [`crate::joints`]，与 [`crate::control::RobotCmd`] 的
/// 向量下标一一对应。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotState {
    /// 采样时间戳（纳秒，机器人侧单调时钟）
    pub stamp_ns: u64,
    /// 关节位置（rad）
    pub q: [f32; JOINT_COUNT],
    /// 关节速度（rad/s）
    pub dq: [f32; JOINT_COUNT],
    /// 关节力矩（N·m）
    pub tau: [f32; JOINT_COUNT],
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            stamp_ns: 0,
            q: [0.0; JOINT_COUNT],
            dq: [0.0; JOINT_COUNT],
            tau: [0.0; JOINT_COUNT],
        }
    }
}

impl RobotState {
    pub fn encode_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(ROBOT_STATE_PAYLOAD_LEN);
        buf.put_u64(self.stamp_ns);
        for arr in [&self.q, &self.dq, &self.tau] {
            for &v in arr.iter() {
                buf.put_f32(v);
            }
        }
        buf.freeze()
    }

    pub fn decode_payload(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        need(&buf, ROBOT_STATE_PAYLOAD_LEN, "RobotState payload")?;
        let stamp_ns = buf.get_u64();
        let mut state = Self {
            stamp_ns,
            ..Self::default()
        };
        for arr in [&mut state.q, &mut state.dq, &mut state.tau] {
            for v in arr.iter_mut() {
                *v = buf.get_f32();
            }
        }
        Ok(state)
    }
}

/// 遥控器摇杆输入
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorJoy {
    /// 采样时间戳（纳秒）
    pub stamp_ns: u64,
    /// 摇杆轴值（归一化到 [-1, 1]）
    pub axes: Vec<f32>,
    /// 按键状态（0 未按下）
    pub buttons: Vec<i32>,
}

impl SensorJoy {
    pub fn encode_payload(&self) -> Result<Bytes, ProtocolError> {
        if self.axes.len() > MAX_JOY_CHANNELS {
            return Err(ProtocolError::FieldTooLong {
                field: "axes",
                len: self.axes.len(),
                max: MAX_JOY_CHANNELS,
            });
        }
        if self.buttons.len() > MAX_JOY_CHANNELS {
            return Err(ProtocolError::FieldTooLong {
                field: "buttons",
                len: self.buttons.len(),
                max: MAX_JOY_CHANNELS,
            });
        }
        let mut buf = BytesMut::with_capacity(10 + 4 * (self.axes.len() + self.buttons.len()));
        buf.put_u64(self.stamp_ns);
        buf.put_u8(self.axes.len() as u8);
        for &v in &self.axes {
            buf.put_f32(v);
        }
        buf.put_u8(self.buttons.len() as u8);
        for &v in &self.buttons {
            buf.put_i32(v);
        }
        Ok(buf.freeze())
    }

    pub fn decode_payload(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        need(&buf, 9, "SensorJoy header")?;
        let stamp_ns = buf.get_u64();

        let axes_len = buf.get_u8() as usize;
        if axes_len > MAX_JOY_CHANNELS {
            return Err(ProtocolError::InvalidValue {
                field: "axes_len",
                value: axes_len as u32,
            });
        }
        need(&buf, axes_len * 4 + 1, "SensorJoy axes")?;
        let axes = (0..axes_len).map(|_| buf.get_f32()).collect();

        let buttons_len = buf.get_u8() as usize;
        if buttons_len > MAX_JOY_CHANNELS {
            return Err(ProtocolError::InvalidValue {
                field: "buttons_len",
                value: buttons_len as u32,
            });
        }
        need(&buf, buttons_len * 4, "SensorJoy buttons")?;
        let buttons = (0..buttons_len).map(|_| buf.get_i32()).collect();

        Ok(Self {
            stamp_ns,
            axes,
            buttons,
        })
    }
}

/// 诊断级别
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticLevel {
    Ok = 0,
    Warn = 1,
    Error = 2,
}

/// 诊断值
///
/// 已知子系统名见 humanoid-client 的 `diagnostics` 模块
/// （`imu` / `ethercat` / `calibration`）。`code` 为子系统自定义状态码，
/// 与 `level` 独立（如标定中: level=Warn, code=1）。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticValue {
    /// 产生时间戳（纳秒）
    pub stamp_ns: u64,
    /// 子系统名
    pub name: String,
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 子系统状态码
    pub code: i32,
    /// 人类可读信息
    pub message: String,
}

impl DiagnosticValue {
    pub fn encode_payload(&self) -> Result<Bytes, ProtocolError> {
        if self.name.len() > MAX_STRING_LEN {
            return Err(ProtocolError::FieldTooLong {
                field: "name",
                len: self.name.len(),
                max: MAX_STRING_LEN,
            });
        }
        if self.message.len() > MAX_STRING_LEN {
            return Err(ProtocolError::FieldTooLong {
                field: "message",
                len: self.message.len(),
                max: MAX_STRING_LEN,
            });
        }
        let mut buf = BytesMut::with_capacity(15 + self.name.len() + self.message.len());
        buf.put_u64(self.stamp_ns);
        buf.put_u8(self.level as u8);
        buf.put_i32(self.code);
        buf.put_u8(self.name.len() as u8);
        buf.put_slice(self.name.as_bytes());
        buf.put_u8(self.message.len() as u8);
        buf.put_slice(self.message.as_bytes());
        Ok(buf.freeze())
    }

    pub fn decode_payload(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        need(&buf, 14, "DiagnosticValue header")?;
        let stamp_ns = buf.get_u64();
        let level_byte = buf.get_u8();
        let level = DiagnosticLevel::try_from(level_byte).map_err(|_| {
            ProtocolError::InvalidValue {
                field: "level",
                value: level_byte as u32,
            }
        })?;
        let code = buf.get_i32();

        let name = read_string(&mut buf, "name")?;
        let message = read_string(&mut buf, "message")?;

        Ok(Self {
            stamp_ns,
            name,
            level,
            code,
            message,
        })
    }
}

/// 连接握手应答信息
///
/// `ConnectAck` 的 payload，客户端据此校验协议兼容性与电机配置。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotInfo {
    /// 固件版本（semver 字符串，如 "1.4.2"）
    pub firmware: String,
    /// 电机数量
    pub motor_count: u8,
    /// 电机名称表（与状态/指令向量同序）
    pub motor_names: Vec<String>,
}

impl RobotInfo {
    pub fn encode_payload(&self) -> Result<Bytes, ProtocolError> {
        if self.firmware.len() > MAX_STRING_LEN {
            return Err(ProtocolError::FieldTooLong {
                field: "firmware",
                len: self.firmware.len(),
                max: MAX_STRING_LEN,
            });
        }
        let mut buf = BytesMut::new();
        buf.put_u8(self.firmware.len() as u8);
        buf.put_slice(self.firmware.as_bytes());
        buf.put_u8(self.motor_count);
        buf.put_u8(self.motor_names.len() as u8);
        for name in &self.motor_names {
            if name.len() > MAX_STRING_LEN {
                return Err(ProtocolError::FieldTooLong {
                    field: "motor_name",
                    len: name.len(),
                    max: MAX_STRING_LEN,
                });
            }
            buf.put_u8(name.len() as u8);
            buf.put_slice(name.as_bytes());
        }
        Ok(buf.freeze())
    }

    pub fn decode_payload(payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut buf = payload;
        let firmware = read_string(&mut buf, "firmware")?;
        need(&buf, 2, "RobotInfo counts")?;
        let motor_count = buf.get_u8();
        let names_len = buf.get_u8() as usize;
        let mut motor_names = Vec::with_capacity(names_len);
        for _ in 0..names_len {
            motor_names.push(read_string(&mut buf, "motor_name")?);
        }
        Ok(Self {
            firmware,
            motor_count,
            motor_names,
        })
    }
}

/// 读取 `u8` 长度前缀的 UTF-8 字符串
fn read_string(buf: &mut &[u8], field: &'static str) -> Result<String, ProtocolError> {
    need(buf, 1, field)?;
    let len = buf.get_u8() as usize;
    need(buf, len, field)?;
    let bytes = &buf[..len];
    let s = std::str::from_utf8(bytes)
        .map_err(|_| ProtocolError::InvalidValue {
            field,
            value: len as u32,
        })?
        .to_owned();
    buf.advance(len);
    Ok(s)
}
