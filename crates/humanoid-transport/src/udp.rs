//! UDP 链路
//!
//! 客户端绑定临时端口并 `connect()` 到机器人地址，之后收发都只与该
//! 对端通信（内核层过滤掉其他来源的数据报）。读超时用于让 RX 线程
//! 周期性检查退出标志。

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::{Transport, TransportError};

/// 默认读超时
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// UDP 数据报链路
pub struct UdpLink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpLink {
    /// 建立到机器人地址的 UDP 链路
    ///
    /// 绑定 `0.0.0.0:0`（内核分配端口），`connect` 到对端并设置读超时。
    /// 注意：UDP 的 `connect` 不产生任何网络流量，连通性要靠协议层
    /// 握手确认。
    pub fn connect(
        robot_addr: impl ToSocketAddrs,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let peer = robot_addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Io(std::io::Error::other("no address resolved")))?;

        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(peer)?;
        socket.set_read_timeout(Some(read_timeout))?;

        debug!(local = %socket.local_addr()?, %peer, "UDP link established");
        Ok(Self { socket, peer })
    }

    /// 对端地址
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpLink {
    fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.socket.send(data)?;
        Ok(())
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.socket.recv(buf) {
            Ok(n) => Ok(n),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Err(TransportError::Timeout)
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn describe(&self) -> String {
        format!("udp://{}", self.peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 环回收发：用一个对端 socket 模拟机器人
    #[test]
    fn test_udp_loopback_roundtrip() {
        let robot = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        let robot_addr = robot.local_addr().unwrap();

        let link = UdpLink::connect(robot_addr, Duration::from_millis(50)).unwrap();
        link.send(b"ping").unwrap();

        let mut buf = [0u8; 16];
        let (n, client_addr) = robot.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");

        robot.send_to(b"pong", client_addr).unwrap();
        let mut rx = [0u8; 16];
        let n = link.recv(&mut rx).unwrap();
        assert_eq!(&rx[..n], b"pong");
    }

    #[test]
    fn test_udp_recv_timeout() {
        let robot = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        let link = UdpLink::connect(robot.local_addr().unwrap(), Duration::from_millis(20)).unwrap();
        let mut buf = [0u8; 16];
        assert!(matches!(link.recv(&mut buf), Err(TransportError::Timeout)));
    }
}
