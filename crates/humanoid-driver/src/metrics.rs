//! 驱动层运行计数
//!
//! 全部为 `AtomicU64` 自增计数，RX/TX 线程无锁更新，
//! 读取侧通过 [`DriverMetrics::snapshot`] 拿到一致性要求不高的快照。

use std::sync::atomic::{AtomicU64, Ordering};

/// 驱动层计数器
#[derive(Default)]
pub struct DriverMetrics {
    rx_datagrams: AtomicU64,
    tx_datagrams: AtomicU64,
    decode_errors: AtomicU64,
    send_errors: AtomicU64,
    dropped_cmds: AtomicU64,
}

/// 某一时刻的计数快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// 成功解码的下行数据报
    pub rx_datagrams: u64,
    /// 成功发出的上行数据报（含心跳）
    pub tx_datagrams: u64,
    /// 解码失败的数据报
    pub decode_errors: u64,
    /// 发送失败次数
    pub send_errors: u64,
    /// 因队列满被拒绝的指令
    pub dropped_cmds: u64,
}

impl DriverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr_rx(&self) {
        self.rx_datagrams.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_tx(&self) {
        self.tx_datagrams.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_send_error(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_dropped_cmd(&self) {
        self.dropped_cmds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rx_datagrams: self.rx_datagrams.load(Ordering::Relaxed),
            tx_datagrams: self.tx_datagrams.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            dropped_cmds: self.dropped_cmds.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = DriverMetrics::new();
        metrics.incr_rx();
        metrics.incr_rx();
        metrics.incr_decode_error();
        metrics.incr_dropped_cmd();

        let snap = metrics.snapshot();
        assert_eq!(snap.rx_datagrams, 2);
        assert_eq!(snap.decode_errors, 1);
        assert_eq!(snap.dropped_cmds, 1);
        assert_eq!(snap.tx_datagrams, 0);
    }
}
