//! Connection Monitor - Monitors inbound datagrams to detect link aliveness
//!
//! **Purpose**: Detect if the robot is still responding (powered on, network
//! reachable). Any decoded inbound datagram counts as feedback.
//!
//! **App Start Relative Time Pattern**:
//! - Uses monotonic time anchored to application start
//! - Unaffected by system clock changes (NTP, manual adjustments)
//! - Safe to store in AtomicU64 for lock-free access

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global anchor point for monotonic time
/// Set once on first access, never changes
static APP_START: OnceLock<Instant> = OnceLock::new();

/// Get monotonic time as microseconds since app start
fn get_monotonic_micros() -> u64 {
    let start = APP_START.get_or_init(Instant::now);
    start.elapsed().as_micros() as u64
}

/// Connection health monitor
///
/// Tracks the time since the last datagram was received from the robot.
pub struct ConnectionMonitor {
    last_feedback: AtomicU64,
    timeout: Duration,
}

impl ConnectionMonitor {
    /// Create a new connection monitor
    ///
    /// # Parameters
    /// - `timeout`: Maximum duration without inbound datagrams before the
    ///   link is considered lost
    pub fn new(timeout: Duration) -> Self {
        let now = get_monotonic_micros();
        Self {
            last_feedback: AtomicU64::new(now),
            timeout,
        }
    }

    /// Check if the link is still alive
    pub fn check_connection(&self) -> bool {
        let last_us = self.last_feedback.load(Ordering::Relaxed);
        let now_us = get_monotonic_micros();
        let elapsed = Duration::from_micros(now_us.saturating_sub(last_us));
        elapsed < self.timeout
    }

    /// Register that a datagram was received from the robot
    ///
    /// Called by the RX loop after each successful decode.
    pub fn register_feedback(&self) {
        let now = get_monotonic_micros();
        self.last_feedback.store(now, Ordering::Relaxed);
    }

    /// Time since last feedback
    pub fn time_since_last_feedback(&self) -> Duration {
        let last_us = self.last_feedback.load(Ordering::Relaxed);
        let now_us = get_monotonic_micros();
        Duration::from_micros(now_us.saturating_sub(last_us))
    }
}
