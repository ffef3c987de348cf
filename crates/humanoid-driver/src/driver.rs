//! 驱动实例：线程生命周期与指令入口
//!
//! [`Driver::spawn`] 在已完成协议握手的传输上启动 RX / TX / 心跳三个
//! 后台线程；[`Driver::shutdown`]（或 Drop）置退出标志、回收线程并
//! 尽力发送 Disconnect。

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError, bounded};
use tracing::{debug, warn};

use humanoid_protocol::{MessageType, RobotCmd};
use humanoid_transport::Transport;

use crate::error::DriverError;
use crate::hooks::HookRegistry;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::{self, IoShared, PipelineConfig};
use crate::state::SharedState;

/// 后台 IO 驱动
///
/// 持有三个后台线程；所有读取入口（快照、计数、连接状态）
/// 都是 wait-free 的，可在任意线程调用。
pub struct Driver {
    shared: Arc<IoShared>,
    cmd_tx: Sender<RobotCmd>,
    cmd_capacity: usize,
    rx_handle: Option<JoinHandle<()>>,
    tx_handle: Option<JoinHandle<()>>,
    hb_handle: Option<JoinHandle<()>>,
}

impl Driver {
    /// 在已握手的传输上启动后台线程
    ///
    /// `hooks` 由调用方持有并共享，注册先于或晚于 spawn 均可生效。
    pub fn spawn(
        transport: Arc<dyn Transport>,
        hooks: Arc<HookRegistry>,
        config: PipelineConfig,
    ) -> Result<Self, DriverError> {
        let shared = Arc::new(IoShared::new(transport, hooks, config.connection_timeout));
        let (cmd_tx, cmd_rx) = bounded::<RobotCmd>(config.cmd_queue_len);

        let rx_shared = Arc::clone(&shared);
        let rx_handle = std::thread::Builder::new()
            .name("humanoid-rx".into())
            .spawn(move || pipeline::rx_loop(rx_shared))
            .map_err(|e| DriverError::Transport(e.into()))?;

        let tx_shared = Arc::clone(&shared);
        let tx_handle = std::thread::Builder::new()
            .name("humanoid-tx".into())
            .spawn(move || pipeline::tx_loop(tx_shared, cmd_rx))
            .map_err(|e| DriverError::Transport(e.into()))?;

        let hb_shared = Arc::clone(&shared);
        let hb_period = config.heartbeat_period;
        let hb_handle = std::thread::Builder::new()
            .name("humanoid-hb".into())
            .spawn(move || pipeline::heartbeat_loop(hb_shared, hb_period))
            .map_err(|e| DriverError::Transport(e.into()))?;

        debug!(
            transport = %shared.transport.describe(),
            queue = config.cmd_queue_len,
            "Driver threads started"
        );

        Ok(Self {
            shared,
            cmd_tx,
            cmd_capacity: config.cmd_queue_len,
            rx_handle: Some(rx_handle),
            tx_handle: Some(tx_handle),
            hb_handle: Some(hb_handle),
        })
    }

    /// 非阻塞入队一条控制指令
    ///
    /// 队列满返回 [`DriverError::ChannelFull`]（拒绝最新，不覆盖旧指令）。
    pub fn send_cmd(&self, cmd: RobotCmd) -> Result<(), DriverError> {
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.shared.metrics.incr_dropped_cmd();
                Err(DriverError::ChannelFull {
                    capacity: self.cmd_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(DriverError::ChannelClosed),
        }
    }

    /// 共享快照句柄
    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.shared.state)
    }

    /// 运行计数快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// 链路是否在线（最近收到过下行数据报）
    pub fn is_connected(&self) -> bool {
        self.shared.monitor.check_connection()
    }

    /// 停止后台线程并发送 Disconnect（幂等）
    pub fn shutdown(&mut self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        for handle in [
            self.rx_handle.take(),
            self.tx_handle.take(),
            self.hb_handle.take(),
        ]
        .into_iter()
        .flatten()
        {
            if handle.join().is_err() {
                warn!("Driver thread panicked during shutdown");
            }
        }
        // 尽力告知机器人回收会话；失败无需处理
        self.shared
            .send_datagram(MessageType::Disconnect, bytes::Bytes::new());
        debug!("Driver shut down");
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    use humanoid_protocol::{Datagram, DiagnosticLevel, ImuData, RobotState};
    use humanoid_transport::{MockTransport, TransportError};

    /// 发送阻塞的传输，用于堵住 TX 线程以填满指令队列
    struct StalledTransport;

    impl Transport for StalledTransport {
        fn send(&self, _data: &[u8]) -> Result<(), TransportError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        }

        fn recv(&self, _buf: &mut [u8]) -> Result<usize, TransportError> {
            std::thread::sleep(Duration::from_millis(10));
            Err(TransportError::Timeout)
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn feedback_datagram(msg_type: MessageType, payload: bytes::Bytes) -> Vec<u8> {
        Datagram::new(msg_type, 0, payload).unwrap().encode().to_vec()
    }

    #[test]
    fn test_rx_dispatch_and_snapshot() {
        let mock = MockTransport::new();
        let hooks = Arc::new(HookRegistry::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&hits);
        hooks.add_imu(move |imu| {
            assert_eq!(imu.stamp_ns, 77);
            c.fetch_add(1, Ordering::SeqCst);
        });

        let driver = Driver::spawn(
            Arc::new(mock.clone()),
            hooks,
            PipelineConfig::default(),
        )
        .unwrap();

        let imu = ImuData {
            stamp_ns: 77,
            quat: [1.0, 0.0, 0.0, 0.0],
            ..Default::default()
        };
        mock.inject(feedback_datagram(MessageType::ImuData, imu.encode_payload()));

        assert!(wait_until(Duration::from_secs(1), || {
            hits.load(Ordering::SeqCst) == 1
        }));
        assert_eq!(driver.state().imu().unwrap().stamp_ns, 77);
        assert!(driver.metrics().rx_datagrams >= 1);
    }

    #[test]
    fn test_bad_datagram_counted_not_fatal() {
        let mock = MockTransport::new();
        let driver = Driver::spawn(
            Arc::new(mock.clone()),
            Arc::new(HookRegistry::new()),
            PipelineConfig::default(),
        )
        .unwrap();

        mock.inject(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let state = RobotState::default();
        mock.inject(feedback_datagram(
            MessageType::RobotState,
            state.encode_payload(),
        ));

        assert!(wait_until(Duration::from_secs(1), || {
            driver.state().robot_state().is_some()
        }));
        assert_eq!(driver.metrics().decode_errors, 1);
    }

    #[test]
    fn test_cmd_goes_out_on_wire() {
        let mock = MockTransport::new();
        let driver = Driver::spawn(
            Arc::new(mock.clone()),
            Arc::new(HookRegistry::new()),
            PipelineConfig::default(),
        )
        .unwrap();

        driver.send_cmd(RobotCmd::zeros(5)).unwrap();

        assert!(wait_until(Duration::from_secs(1), || {
            mock.sent()
                .iter()
                .filter_map(|raw| Datagram::decode(raw).ok())
                .any(|dg| dg.msg_type == MessageType::RobotCmd)
        }));
    }

    #[test]
    fn test_heartbeat_emitted() {
        let mock = MockTransport::new();
        let config = PipelineConfig {
            heartbeat_period: Duration::from_millis(20),
            ..Default::default()
        };
        let _driver = Driver::spawn(
            Arc::new(mock.clone()),
            Arc::new(HookRegistry::new()),
            config,
        )
        .unwrap();

        assert!(wait_until(Duration::from_secs(1), || {
            mock.sent()
                .iter()
                .filter_map(|raw| Datagram::decode(raw).ok())
                .filter(|dg| dg.msg_type == MessageType::Heartbeat)
                .count()
                >= 2
        }));
    }

    #[test]
    fn test_link_loss_emits_diagnostic() {
        let mock = MockTransport::new();
        let hooks = Arc::new(HookRegistry::new());
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let c = Arc::clone(&events);
        hooks.add_diagnostic(move |diag| {
            if diag.name == "connection" {
                c.lock().unwrap().push(diag.level);
            }
        });

        let config = PipelineConfig {
            connection_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let driver = Driver::spawn(Arc::new(mock.clone()), hooks, config).unwrap();

        // 无任何下行数据报 → 链路丢失
        assert!(wait_until(Duration::from_secs(1), || {
            events.lock().unwrap().first() == Some(&DiagnosticLevel::Error)
        }));
        assert!(!driver.is_connected());

        // 数据恢复 → 链路恢复
        mock.inject(feedback_datagram(
            MessageType::ImuData,
            ImuData::default().encode_payload(),
        ));
        assert!(wait_until(Duration::from_secs(1), || {
            events.lock().unwrap().last() == Some(&DiagnosticLevel::Ok)
        }));
        assert!(driver.is_connected());
    }

    #[test]
    fn test_queue_full_rejects_newest() {
        let config = PipelineConfig {
            cmd_queue_len: 2,
            ..Default::default()
        };
        let driver = Driver::spawn(
            Arc::new(StalledTransport),
            Arc::new(HookRegistry::new()),
            config,
        )
        .unwrap();

        // TX 线程被传输堵住，快速入队必然溢出容量 2 的队列
        let mut rejected = 0u64;
        for stamp in 0..16u64 {
            match driver.send_cmd(RobotCmd::zeros(stamp)) {
                Ok(()) => {}
                Err(DriverError::ChannelFull { capacity }) => {
                    assert_eq!(capacity, 2);
                    rejected += 1;
                }
                Err(e) => panic!("unexpected send_cmd error: {e}"),
            }
        }

        assert!(rejected > 0, "queue never reported full");
        assert_eq!(driver.metrics().dropped_cmds, rejected);
    }

    #[test]
    fn test_send_after_shutdown_fails() {
        let mock = MockTransport::new();
        let mut driver = Driver::spawn(
            Arc::new(mock.clone()),
            Arc::new(HookRegistry::new()),
            PipelineConfig::default(),
        )
        .unwrap();

        driver.shutdown();
        assert!(matches!(
            driver.send_cmd(RobotCmd::zeros(0)),
            Err(DriverError::ChannelClosed)
        ));

        // Disconnect 已尽力发出
        assert!(mock.sent().iter().any(|raw| {
            Datagram::decode(raw)
                .map(|dg| dg.msg_type == MessageType::Disconnect)
                .unwrap_or(false)
        }));
    }
}
