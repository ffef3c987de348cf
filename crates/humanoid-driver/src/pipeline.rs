//! IO 循环模块
//!
//! 负责后台线程的数据报收发：
//! - `rx_loop`: 接收 → 解码 → 快照提交 → 回调分发
//! - `tx_loop`: 指令队列消费与发送
//! - `heartbeat_loop`: 周期性心跳
//!
//! 三个循环共享 [`IoShared`]，通过 `AtomicBool` 统一退出。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, trace, warn};

use humanoid_protocol::{
    Datagram, DiagnosticLevel, DiagnosticValue, HEADER_LEN, ImuData, MAX_PAYLOAD_LEN, MessageType,
    ProtocolError, RobotCmd, RobotState, SensorJoy,
};
use humanoid_transport::{Transport, TransportError};

use crate::heartbeat::ConnectionMonitor;
use crate::hooks::HookRegistry;
use crate::metrics::DriverMetrics;
use crate::state::SharedState;

/// IO 线程配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 心跳发送周期
    pub heartbeat_period: Duration,
    /// 判定链路丢失的无数据时长
    pub connection_timeout: Duration,
    /// 指令队列容量（满则拒绝最新指令）
    pub cmd_queue_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            heartbeat_period: Duration::from_millis(500),
            connection_timeout: Duration::from_secs(2),
            cmd_queue_len: 16,
        }
    }
}

/// 客户端侧时间戳（UNIX 纳秒）
pub fn client_stamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// RX / TX / 心跳线程共享的上下文
pub(crate) struct IoShared {
    pub transport: Arc<dyn Transport>,
    pub state: Arc<SharedState>,
    pub hooks: Arc<HookRegistry>,
    pub metrics: Arc<DriverMetrics>,
    pub monitor: Arc<ConnectionMonitor>,
    pub running: Arc<AtomicBool>,
    /// 上行方向（客户端 → 机器人）统一递增的序号
    tx_seq: AtomicU16,
}

impl IoShared {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        hooks: Arc<HookRegistry>,
        connection_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            state: Arc::new(SharedState::new()),
            hooks,
            metrics: Arc::new(DriverMetrics::new()),
            monitor: Arc::new(ConnectionMonitor::new(connection_timeout)),
            running: Arc::new(AtomicBool::new(true)),
            tx_seq: AtomicU16::new(0),
        }
    }

    pub(crate) fn next_seq(&self) -> u16 {
        self.tx_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// 发送一个上行数据报，失败只记数不传播（UDP 尽力而为）
    pub(crate) fn send_datagram(&self, msg_type: MessageType, payload: impl Into<bytes::Bytes>) {
        let dg = match Datagram::new(msg_type, self.next_seq(), payload) {
            Ok(dg) => dg,
            Err(e) => {
                warn!(error = %e, ?msg_type, "Failed to build datagram");
                return;
            }
        };
        match self.transport.send(&dg.encode()) {
            Ok(()) => self.metrics.incr_tx(),
            Err(e) => {
                self.metrics.incr_send_error();
                warn!(error = %e, ?msg_type, "Failed to send datagram");
            }
        }
    }

    /// 合成链路诊断（name = "connection"），与机器人下发的诊断走同一条通路
    fn emit_link_diagnostic(&self, level: DiagnosticLevel, code: i32, message: &str) {
        let diag = Arc::new(DiagnosticValue {
            stamp_ns: client_stamp_ns(),
            name: "connection".to_string(),
            level,
            code,
            message: message.to_string(),
        });
        self.state.commit_diagnostic(Arc::clone(&diag));
        self.hooks.dispatch_diagnostic(diag);
    }
}

/// RX 循环：接收 → 解码 → 提交 → 分发
pub(crate) fn rx_loop(shared: Arc<IoShared>) {
    #[cfg(feature = "realtime")]
    if let Err(e) = thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max)
    {
        warn!(?e, "Failed to raise RX thread priority");
    }

    let mut buf = vec![0u8; HEADER_LEN + MAX_PAYLOAD_LEN];
    // 握手刚刚成功，链路初始视为在线
    let mut link_up = true;

    while shared.running.load(Ordering::Relaxed) {
        match shared.transport.recv(&mut buf) {
            Ok(n) => match Datagram::decode(&buf[..n]) {
                Ok(dg) => {
                    shared.metrics.incr_rx();
                    shared.monitor.register_feedback();
                    if !link_up {
                        link_up = true;
                        debug!("Robot link recovered");
                        shared.emit_link_diagnostic(
                            DiagnosticLevel::Ok,
                            0,
                            "Robot link recovered.",
                        );
                    }
                    handle_datagram(&shared, &dg);
                }
                Err(e) => {
                    shared.metrics.incr_decode_error();
                    warn!(error = %e, len = n, "Dropped undecodable datagram");
                }
            },
            Err(TransportError::Timeout) => {}
            Err(TransportError::Closed) => {
                debug!("Transport closed, RX loop exiting");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Transport receive failed");
            }
        }

        if link_up && !shared.monitor.check_connection() {
            link_up = false;
            warn!(
                silence = ?shared.monitor.time_since_last_feedback(),
                "Robot link lost"
            );
            shared.emit_link_diagnostic(DiagnosticLevel::Error, -1, "Robot link lost.");
        }
    }
    trace!("RX loop exited");
}

/// 按消息类型分发一个已解码的数据报
fn handle_datagram(shared: &IoShared, dg: &Datagram) {
    let result = match dg.msg_type {
        MessageType::ImuData => ImuData::decode_payload(&dg.payload).map(|data| {
            let data = Arc::new(data);
            shared.state.commit_imu(Arc::clone(&data));
            shared.hooks.dispatch_imu(data);
        }),
        MessageType::RobotState => RobotState::decode_payload(&dg.payload).map(|data| {
            let data = Arc::new(data);
            shared.state.commit_robot_state(Arc::clone(&data));
            shared.hooks.dispatch_robot_state(data);
        }),
        MessageType::SensorJoy => SensorJoy::decode_payload(&dg.payload).map(|data| {
            let data = Arc::new(data);
            shared.state.commit_joy(Arc::clone(&data));
            shared.hooks.dispatch_sensor_joy(data);
        }),
        MessageType::DiagnosticValue => DiagnosticValue::decode_payload(&dg.payload).map(|data| {
            let data = Arc::new(data);
            shared.state.commit_diagnostic(Arc::clone(&data));
            shared.hooks.dispatch_diagnostic(data);
        }),
        // 握手在 IO 线程启动之前完成，迟到的 ACK 直接忽略
        MessageType::ConnectAck => {
            debug!(seq = dg.seq, "Ignoring late ConnectAck");
            Ok(())
        }
        // 客户端 → 机器人方向的类型不应出现在下行链路
        other => Err(ProtocolError::UnknownMessageType { value: other as u8 }),
    };

    if let Err(e) = result {
        shared.metrics.incr_decode_error();
        warn!(error = %e, msg_type = ?dg.msg_type, seq = dg.seq, "Bad feedback payload");
    }
}

/// TX 循环：消费指令队列并发送
pub(crate) fn tx_loop(shared: Arc<IoShared>, cmd_rx: Receiver<RobotCmd>) {
    while shared.running.load(Ordering::Relaxed) {
        match cmd_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(cmd) => {
                shared.send_datagram(MessageType::RobotCmd, cmd.encode_payload());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    trace!("TX loop exited");
}

/// 心跳循环
///
/// 以 50ms 粒度轮询退出标志，按 `period` 节奏发送心跳。
/// 使用 spin_sleep 保证小睡眠段的实际时长不会被系统调度放大太多。
pub(crate) fn heartbeat_loop(shared: Arc<IoShared>, period: Duration) {
    let sleeper = spin_sleep::SpinSleeper::default();
    let tick = Duration::from_millis(50).min(period);
    let mut last_beat = Instant::now();

    // 启动即发一次，缩短机器人侧的会话确认延迟
    shared.send_datagram(MessageType::Heartbeat, bytes::Bytes::new());

    while shared.running.load(Ordering::Relaxed) {
        sleeper.sleep(tick);
        if last_beat.elapsed() >= period {
            last_beat = Instant::now();
            shared.send_datagram(MessageType::Heartbeat, bytes::Bytes::new());
        }
    }
    trace!("Heartbeat loop exited");
}
