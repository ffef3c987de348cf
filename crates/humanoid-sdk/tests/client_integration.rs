//! 客户端 ↔ 机器人端到端测试
//!
//! 在环回地址上起一个假机器人（UDP），验证握手、订阅分发、指令下行
//! 与断开流程。所有测试共享进程级单例，必须串行执行。

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serial_test::serial;

use humanoid_sdk::prelude::*;
use humanoid_sdk::protocol::{Datagram, MessageType, RobotInfo};

/// 环回假机器人：应答握手、回显指令、持续推送 IMU 流
struct FakeRobot {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Datagram>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeRobot {
    fn spawn(stream_imu: bool) -> Self {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        let addr = socket.local_addr().unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let received_thread = Arc::clone(&received);
        let stop_thread = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            let mut client: Option<SocketAddr> = None;
            let mut seq: u16 = 0;
            let mut imu_stamp: u64 = 1_000;
            let mut buf = [0u8; 2048];

            let send = |socket: &UdpSocket,
                            to: SocketAddr,
                            seq: &mut u16,
                            msg_type: MessageType,
                            payload: bytes::Bytes| {
                let dg = Datagram::new(msg_type, *seq, payload).unwrap();
                *seq = seq.wrapping_add(1);
                let _ = socket.send_to(&dg.encode(), to);
            };

            while !stop_thread.load(Ordering::Relaxed) {
                match socket.recv_from(&mut buf) {
                    Ok((n, from)) => {
                        let Ok(dg) = Datagram::decode(&buf[..n]) else {
                            continue;
                        };
                        received_thread.lock().unwrap().push(dg.clone());
                        match dg.msg_type {
                            MessageType::Connect => {
                                client = Some(from);
                                let info = RobotInfo {
                                    firmware: "1.4.2".into(),
                                    motor_count: JOINT_COUNT as u8,
                                    motor_names: JOINT_NAMES
                                        .iter()
                                        .map(|s| s.to_string())
                                        .collect(),
                                };
                                send(
                                    &socket,
                                    from,
                                    &mut seq,
                                    MessageType::ConnectAck,
                                    info.encode_payload().unwrap(),
                                );
                            }
                            MessageType::RobotCmd => {
                                // 指令回显为状态：下标 i 的指令对应下标 i 的状态
                                if let Ok(cmd) = RobotCmd::decode_payload(&dg.payload) {
                                    let state = RobotState {
                                        stamp_ns: cmd.stamp_ns,
                                        q: cmd.q,
                                        ..Default::default()
                                    };
                                    send(
                                        &socket,
                                        from,
                                        &mut seq,
                                        MessageType::RobotState,
                                        state.encode_payload(),
                                    );
                                }
                            }
                            _ => {}
                        }
                    }
                    Err(_) => {}
                }

                if stream_imu {
                    if let Some(to) = client {
                        let imu = ImuData {
                            stamp_ns: imu_stamp,
                            quat: [1.0, 0.0, 0.0, 0.0],
                            gyro: [0.0, 0.0, 0.1],
                            acc: [0.0, 0.0, 9.81],
                        };
                        imu_stamp += 1;
                        send(
                            &socket,
                            to,
                            &mut seq,
                            MessageType::ImuData,
                            imu.encode_payload(),
                        );
                    }
                }
            }
        });

        Self {
            addr,
            received,
            stop,
            handle: Some(handle),
        }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig {
            robot_ip: "127.0.0.1".into(),
            robot_port: self.addr.port(),
            connect_timeout_ms: 200,
            connect_attempts: 3,
            connection_timeout_ms: 500,
            ..Default::default()
        }
    }

    fn received_types(&self) -> Vec<MessageType> {
        self.received.lock().unwrap().iter().map(|d| d.msg_type).collect()
    }
}

impl Drop for FakeRobot {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
#[serial]
fn test_full_cycle_over_loopback_udp() {
    let robot = FakeRobot::spawn(true);
    let humanoid = Humanoid::instance();
    // 单例可能被其他串行测试留在已连接状态
    humanoid.shutdown();

    let (imu_tx, imu_rx) = mpsc::channel();
    humanoid.subscribe_imu_data(move |imu| {
        let _ = imu_tx.send(imu.stamp_ns);
    });

    humanoid.init_with_config(robot.config()).unwrap();
    assert_eq!(humanoid.robot_info().unwrap().firmware, "1.4.2");
    assert_eq!(humanoid.motor_number(), 31);

    // IMU 流抵达回调与快照
    let stamp = imu_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(stamp >= 1_000);
    assert!(wait_until(Duration::from_secs(2), || humanoid.imu().is_some()));
    assert_eq!(humanoid.imu().unwrap().quat[0], 1.0);
    assert!(humanoid.is_connected());

    // 心跳与指令到达机器人侧
    let mut cmd = RobotCmd::zeros(0);
    cmd.q[7] = 0.42;
    cmd.kp = [50.0; JOINT_COUNT];
    humanoid.publish_robot_cmd(cmd).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        robot.received_types().contains(&MessageType::RobotCmd)
    }));
    assert!(wait_until(Duration::from_secs(2), || {
        robot.received_types().contains(&MessageType::Heartbeat)
    }));

    // 指令回显：下标 7 的指令映射回下标 7 的状态（同一物理关节）
    assert!(wait_until(Duration::from_secs(2), || {
        humanoid
            .robot_state()
            .map(|s| (s.q[7] - 0.42).abs() < 1e-6)
            .unwrap_or(false)
    }));

    humanoid.shutdown();
    assert!(wait_until(Duration::from_secs(2), || {
        robot.received_types().contains(&MessageType::Disconnect)
    }));
}

#[test]
#[serial]
fn test_connect_timeout_against_silent_peer() {
    // 绑定但从不应答的对端
    let silent = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
    let humanoid = Humanoid::instance();
    humanoid.shutdown();

    let config = ClientConfig {
        robot_ip: "127.0.0.1".into(),
        robot_port: silent.local_addr().unwrap().port(),
        connect_timeout_ms: 50,
        connect_attempts: 2,
        ..Default::default()
    };
    let err = humanoid.init_with_config(config).unwrap_err();
    assert!(matches!(err, ClientError::ConnectTimeout { attempts: 2 }));
    assert!(!humanoid.is_connected());
}

#[test]
#[serial]
fn test_reinit_after_shutdown() {
    let robot = FakeRobot::spawn(false);
    let humanoid = Humanoid::instance();
    humanoid.shutdown();

    humanoid.init_with_config(robot.config()).unwrap();
    humanoid.shutdown();
    humanoid.init_with_config(robot.config()).unwrap();
    assert!(humanoid.robot_info().is_some());
    humanoid.shutdown();
}
