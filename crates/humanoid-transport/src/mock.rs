//! 测试用内存传输
//!
//! 两个方向各一条队列：测试侧 `inject()` 模拟机器人下发数据，
//! `sent()` 取出客户端已发送的数据报。克隆共享同一份内部状态，
//! 方便测试在把实例交给 driver 后继续操作队列。

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::{Transport, TransportError};

/// 无数据时 `recv` 的等待上限（模拟 UDP 读超时）
const RECV_WAIT: Duration = Duration::from_millis(2);

#[derive(Default)]
struct Inner {
    /// 机器人 → 客户端方向（待接收）
    rx_queue: Mutex<VecDeque<Vec<u8>>>,
    rx_signal: Condvar,
    /// 客户端 → 机器人方向（已发送捕获）
    tx_log: Mutex<Vec<Vec<u8>>>,
    closed: Mutex<bool>,
}

/// 内存 mock 传输
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注入一个"机器人下发"的数据报
    pub fn inject(&self, datagram: impl Into<Vec<u8>>) {
        let mut queue = self.inner.rx_queue.lock();
        queue.push_back(datagram.into());
        self.inner.rx_signal.notify_one();
    }

    /// 取出客户端已发送的全部数据报（不清空）
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.inner.tx_log.lock().clone()
    }

    /// 已发送数据报数量
    pub fn sent_count(&self) -> usize {
        self.inner.tx_log.lock().len()
    }

    /// 关闭链路，之后所有收发返回 [`TransportError::Closed`]
    pub fn close(&self) {
        *self.inner.closed.lock() = true;
        self.inner.rx_signal.notify_all();
    }

    fn is_closed(&self) -> bool {
        *self.inner.closed.lock()
    }
}

impl Transport for MockTransport {
    fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.inner.tx_log.lock().push(data.to_vec());
        Ok(())
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut queue = self.inner.rx_queue.lock();
        if queue.is_empty() {
            if self.is_closed() {
                return Err(TransportError::Closed);
            }
            self.inner.rx_signal.wait_for(&mut queue, RECV_WAIT);
        }
        match queue.pop_front() {
            Some(datagram) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok(n)
            }
            None if self.is_closed() => Err(TransportError::Closed),
            None => Err(TransportError::Timeout),
        }
    }

    fn describe(&self) -> String {
        "mock://".to_string()
    }
}
