//! `Humanoid` 门面
//!
//! 进程级单例：[`Humanoid::instance`] 返回全局唯一实例（惰性构造，
//! 构造函数私有）。生命周期：
//!
//! ```text
//! instance() → subscribe_*()* → init(ip) → publish / 快照读取 → shutdown()
//! ```
//!
//! 订阅在 `init` 前后注册均可；`shutdown` 之后允许重新 `init`
//! （已注册的订阅保留）。

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::Mutex;
use semver::Version;
use thiserror::Error;
use tracing::{debug, info, warn};

use humanoid_driver::{
    Driver, DriverError, HookRegistry, MetricsSnapshot, client_stamp_ns,
};
use humanoid_protocol::{
    Datagram, DiagnosticValue, ImuData, JOINT_COUNT, JOINT_NAMES, MessageType, ProtocolError,
    RobotCmd, RobotInfo, RobotState, SensorJoy,
};
use humanoid_transport::{Transport, TransportError, UdpLink};

use crate::config::{ClientConfig, ConfigError};

/// 支持的最低固件版本（更低版本仅告警，不拒绝连接）
const MIN_FIRMWARE: Version = Version::new(1, 0, 0);

/// 客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 已经初始化（先 `shutdown` 再重新 `init`）
    #[error("Already initialized (call shutdown() first)")]
    AlreadyInitialized,

    /// 尚未初始化
    #[error("Not initialized (call init() first)")]
    NotInitialized,

    /// 握手超时（机器人未应答）
    #[error("Connect timed out after {attempts} attempt(s)")]
    ConnectTimeout { attempts: u32 },

    /// 机器人上报的电机数量与本 SDK 的关节表不一致
    #[error("Motor count mismatch: SDK expects {expected}, robot reports {reported}")]
    MotorCountMismatch { expected: usize, reported: u8 },

    /// 传输层错误
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 配置加载错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 一次成功初始化后的连接内部状态
struct Connection {
    driver: Driver,
    info: RobotInfo,
}

/// 人形机器人控制门面（进程级单例）
pub struct Humanoid {
    hooks: Arc<HookRegistry>,
    conn: Mutex<Option<Connection>>,
}

static INSTANCE: OnceLock<Humanoid> = OnceLock::new();

impl Humanoid {
    /// 获取全局实例
    pub fn instance() -> &'static Humanoid {
        INSTANCE.get_or_init(Humanoid::new)
    }

    fn new() -> Self {
        Self {
            hooks: Arc::new(HookRegistry::new()),
            conn: Mutex::new(None),
        }
    }

    /// 连接到指定地址的机器人/仿真器（其余配置取默认值）
    pub fn init(&self, robot_ip: &str) -> Result<(), ClientError> {
        self.init_with_config(ClientConfig::for_robot_ip(robot_ip))
    }

    /// 按完整配置连接
    pub fn init_with_config(&self, config: ClientConfig) -> Result<(), ClientError> {
        let link = UdpLink::connect(config.robot_addr().as_str(), config.read_timeout())?;
        self.init_with_transport(Arc::new(link), config)
    }

    /// 在自定义传输上连接（mock 测试、自定义链路）
    pub fn init_with_transport(
        &self,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> Result<(), ClientError> {
        let mut conn = self.conn.lock();
        if conn.is_some() {
            return Err(ClientError::AlreadyInitialized);
        }

        let info = handshake(transport.as_ref(), &config)?;
        validate_robot_info(&info)?;

        let driver = Driver::spawn(transport, Arc::clone(&self.hooks), config.pipeline())?;
        info!(
            firmware = %info.firmware,
            motors = info.motor_count,
            robot = %config.robot_addr(),
            "Humanoid SDK initialized"
        );
        *conn = Some(Connection { driver, info });
        Ok(())
    }

    /// 电机总数
    pub fn motor_number(&self) -> u32 {
        JOINT_COUNT as u32
    }

    /// 电机名称表（下标与状态/指令向量一致）
    pub fn motor_names(&self) -> &'static [&'static str] {
        &JOINT_NAMES
    }

    /// 握手时机器人上报的信息；未初始化时为 `None`
    pub fn robot_info(&self) -> Option<RobotInfo> {
        self.conn.lock().as_ref().map(|c| c.info.clone())
    }

    /// 订阅 IMU 数据
    ///
    /// 回调在 RX 线程同步执行，须保持轻量非阻塞。
    pub fn subscribe_imu_data(&self, cb: impl Fn(Arc<ImuData>) + Send + Sync + 'static) {
        self.hooks.add_imu(cb);
    }

    /// 订阅机器人状态（关节顺序见 [`humanoid_protocol::joints`]）
    pub fn subscribe_robot_state(&self, cb: impl Fn(Arc<RobotState>) + Send + Sync + 'static) {
        self.hooks.add_robot_state(cb);
    }

    /// 订阅遥控器摇杆输入
    pub fn subscribe_sensor_joy(&self, cb: impl Fn(Arc<SensorJoy>) + Send + Sync + 'static) {
        self.hooks.add_sensor_joy(cb);
    }

    /// 订阅诊断值（含客户端合成的 `connection` 诊断）
    pub fn subscribe_diagnostic_value(
        &self,
        cb: impl Fn(Arc<DiagnosticValue>) + Send + Sync + 'static,
    ) {
        self.hooks.add_diagnostic(cb);
    }

    /// 发布全关节控制指令
    ///
    /// 指令时间戳为 0 时自动填充当前客户端时钟。
    pub fn publish_robot_cmd(&self, mut cmd: RobotCmd) -> Result<(), ClientError> {
        if cmd.stamp_ns == 0 {
            cmd.stamp_ns = client_stamp_ns();
        }
        let conn = self.conn.lock();
        let conn = conn.as_ref().ok_or(ClientError::NotInitialized)?;
        conn.driver.send_cmd(cmd)?;
        Ok(())
    }

    /// 最新 IMU 快照（无需订阅）
    pub fn imu(&self) -> Option<Arc<ImuData>> {
        self.conn.lock().as_ref().and_then(|c| c.driver.state().imu())
    }

    /// 最新机器人状态快照
    pub fn robot_state(&self) -> Option<Arc<RobotState>> {
        self.conn
            .lock()
            .as_ref()
            .and_then(|c| c.driver.state().robot_state())
    }

    /// 最新摇杆快照
    pub fn sensor_joy(&self) -> Option<Arc<SensorJoy>> {
        self.conn
            .lock()
            .as_ref()
            .and_then(|c| c.driver.state().sensor_joy())
    }

    /// 链路是否在线
    pub fn is_connected(&self) -> bool {
        self.conn
            .lock()
            .as_ref()
            .map(|c| c.driver.is_connected())
            .unwrap_or(false)
    }

    /// 驱动层计数快照；未初始化时为默认零值
    pub fn metrics(&self) -> MetricsSnapshot {
        self.conn
            .lock()
            .as_ref()
            .map(|c| c.driver.metrics())
            .unwrap_or_default()
    }

    /// 断开连接并回收后台线程（幂等；订阅保留，可重新 `init`）
    pub fn shutdown(&self) {
        if let Some(mut conn) = self.conn.lock().take() {
            conn.driver.shutdown();
            debug!("Humanoid SDK shut down");
        }
    }
}

/// 协议握手：发送 Connect，等待携带 RobotInfo 的 ConnectAck
fn handshake(transport: &dyn Transport, config: &ClientConfig) -> Result<RobotInfo, ClientError> {
    let mut buf = vec![0u8; humanoid_protocol::HEADER_LEN + humanoid_protocol::MAX_PAYLOAD_LEN];

    for attempt in 1..=config.connect_attempts {
        let connect = Datagram::empty(MessageType::Connect, attempt as u16);
        transport.send(&connect.encode())?;
        debug!(attempt, "Connect sent");

        let deadline = Instant::now() + config.connect_timeout();
        while Instant::now() < deadline {
            match transport.recv(&mut buf) {
                Ok(n) => match Datagram::decode(&buf[..n]) {
                    Ok(dg) if dg.msg_type == MessageType::ConnectAck => {
                        return Ok(RobotInfo::decode_payload(&dg.payload)?);
                    }
                    // 机器人可能已在推流，握手期间忽略其他报文
                    Ok(dg) => debug!(msg_type = ?dg.msg_type, "Ignoring datagram during handshake"),
                    Err(e) => warn!(error = %e, "Undecodable datagram during handshake"),
                },
                Err(TransportError::Timeout) => {}
                Err(e) => return Err(e.into()),
            }
        }
        warn!(attempt, "No ConnectAck, retrying");
    }

    Err(ClientError::ConnectTimeout {
        attempts: config.connect_attempts,
    })
}

/// 校验握手应答：电机数量必须匹配，名称与固件版本不匹配仅告警
fn validate_robot_info(info: &RobotInfo) -> Result<(), ClientError> {
    if info.motor_count as usize != JOINT_COUNT {
        return Err(ClientError::MotorCountMismatch {
            expected: JOINT_COUNT,
            reported: info.motor_count,
        });
    }

    if !info.motor_names.is_empty()
        && info.motor_names.iter().map(String::as_str).ne(JOINT_NAMES)
    {
        warn!("Robot motor name table differs from SDK joint table");
    }

    match Version::parse(&info.firmware) {
        Ok(version) if version < MIN_FIRMWARE => {
            warn!(
                firmware = %info.firmware,
                minimum = %MIN_FIRMWARE,
                "Robot firmware older than supported minimum"
            );
        }
        Ok(_) => {}
        Err(_) => warn!(firmware = %info.firmware, "Unparseable firmware version"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use humanoid_transport::MockTransport;

    fn fast_config() -> ClientConfig {
        ClientConfig {
            connect_timeout_ms: 50,
            connect_attempts: 2,
            ..Default::default()
        }
    }

    fn full_robot_info() -> RobotInfo {
        RobotInfo {
            firmware: "1.4.2".into(),
            motor_count: JOINT_COUNT as u8,
            motor_names: JOINT_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ack_datagram(info: &RobotInfo) -> Vec<u8> {
        Datagram::new(MessageType::ConnectAck, 0, info.encode_payload().unwrap())
            .unwrap()
            .encode()
            .to_vec()
    }

    #[test]
    fn test_handshake_success() {
        let mock = MockTransport::new();
        mock.inject(ack_datagram(&full_robot_info()));

        let info = handshake(&mock, &fast_config()).unwrap();
        assert_eq!(info.motor_count as usize, JOINT_COUNT);

        // Connect 已上行
        let sent = mock.sent();
        let dg = Datagram::decode(&sent[0]).unwrap();
        assert_eq!(dg.msg_type, MessageType::Connect);
    }

    #[test]
    fn test_handshake_ignores_stream_before_ack() {
        let mock = MockTransport::new();
        mock.inject(
            Datagram::new(MessageType::ImuData, 9, ImuData::default().encode_payload())
                .unwrap()
                .encode()
                .to_vec(),
        );
        mock.inject(ack_datagram(&full_robot_info()));

        assert!(handshake(&mock, &fast_config()).is_ok());
    }

    #[test]
    fn test_handshake_timeout() {
        let mock = MockTransport::new();
        let err = handshake(&mock, &fast_config()).unwrap_err();
        assert!(matches!(err, ClientError::ConnectTimeout { attempts: 2 }));
        // 每次尝试都重发了 Connect
        assert_eq!(mock.sent_count(), 2);
    }

    #[test]
    fn test_motor_count_mismatch_rejected() {
        let info = RobotInfo {
            firmware: "1.4.2".into(),
            motor_count: 6,
            motor_names: vec![],
        };
        assert!(matches!(
            validate_robot_info(&info),
            Err(ClientError::MotorCountMismatch {
                expected: 31,
                reported: 6
            })
        ));
    }

    #[test]
    fn test_old_firmware_is_warning_only() {
        let info = RobotInfo {
            firmware: "0.3.0".into(),
            motor_count: JOINT_COUNT as u8,
            motor_names: vec![],
        };
        assert!(validate_robot_info(&info).is_ok());
    }

    #[test]
    fn test_publish_before_init_fails() {
        let humanoid = Humanoid::new();
        assert!(matches!(
            humanoid.publish_robot_cmd(RobotCmd::zeros(1)),
            Err(ClientError::NotInitialized)
        ));
        assert!(!humanoid.is_connected());
        assert!(humanoid.imu().is_none());
    }

    #[test]
    fn test_init_with_mock_transport_full_cycle() {
        let humanoid = Humanoid::new();
        let mock = MockTransport::new();
        mock.inject(ack_datagram(&full_robot_info()));

        humanoid
            .init_with_transport(Arc::new(mock.clone()), fast_config())
            .unwrap();
        assert_eq!(humanoid.motor_number(), 31);
        assert_eq!(humanoid.robot_info().unwrap().firmware, "1.4.2");

        // 重复 init 被拒绝
        assert!(matches!(
            humanoid.init_with_transport(Arc::new(mock.clone()), fast_config()),
            Err(ClientError::AlreadyInitialized)
        ));

        humanoid.publish_robot_cmd(RobotCmd::zeros(0)).unwrap();
        humanoid.shutdown();
        // shutdown 幂等
        humanoid.shutdown();
        assert!(matches!(
            humanoid.publish_robot_cmd(RobotCmd::zeros(0)),
            Err(ClientError::NotInitialized)
        ));
    }

    #[test]
    fn test_motor_names_match_joint_table() {
        let humanoid = Humanoid::new();
        assert_eq!(humanoid.motor_names().len(), 31);
        assert_eq!(humanoid.motor_names()[12], "waist_yaw_joint");
    }
}
