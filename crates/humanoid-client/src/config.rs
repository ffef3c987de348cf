//! 客户端配置
//!
//! 支持三种来源，优先级从低到高：内置默认值（本地仿真）、TOML 配置
//! 文件、代码内显式构造。所有时长字段以毫秒为单位存储，便于 TOML
//! 直接书写。
//!
//! ```toml
//! # humanoid.toml
//! robot_ip = "10.192.1.2"
//! heartbeat_period_ms = 200
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use humanoid_driver::PipelineConfig;
use humanoid_protocol::{DEFAULT_SIM_IP, ROBOT_PORT};

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 机器人地址（仿真 "127.0.0.1"，实机如 "10.192.1.2"）
    pub robot_ip: String,
    /// 机器人监听端口
    pub robot_port: u16,
    /// 传输层读超时（RX 线程轮询粒度）
    pub read_timeout_ms: u64,
    /// 单次握手等待 ConnectAck 的超时
    pub connect_timeout_ms: u64,
    /// 握手重试次数
    pub connect_attempts: u32,
    /// 心跳周期
    pub heartbeat_period_ms: u64,
    /// 判定链路丢失的静默时长
    pub connection_timeout_ms: u64,
    /// 指令队列容量
    pub cmd_queue_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            robot_ip: DEFAULT_SIM_IP.to_string(),
            robot_port: ROBOT_PORT,
            read_timeout_ms: 100,
            connect_timeout_ms: 500,
            connect_attempts: 3,
            heartbeat_period_ms: 500,
            connection_timeout_ms: 2_000,
            cmd_queue_len: 16,
        }
    }
}

impl ClientConfig {
    /// 指定机器人地址，其余保持默认
    pub fn for_robot_ip(ip: impl Into<String>) -> Self {
        Self {
            robot_ip: ip.into(),
            ..Self::default()
        }
    }

    /// 从 TOML 文件加载；缺省字段回落到默认值
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// `ip:port` 形式的机器人地址
    pub fn robot_addr(&self) -> String {
        format!("{}:{}", self.robot_ip, self.robot_port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub(crate) fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            heartbeat_period: Duration::from_millis(self.heartbeat_period_ms),
            connection_timeout: Duration::from_millis(self.connection_timeout_ms),
            cmd_queue_len: self.cmd_queue_len,
        }
    }
}
