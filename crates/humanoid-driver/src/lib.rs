//! 驱动层模块
//!
//! 本模块提供人形机器人 SDK 的后台 IO 能力，包括：
//! - RX / TX / 心跳线程管理
//! - 快照同步（ArcSwap 无锁读取）
//! - 订阅回调注册与分发
//! - 链路健康监测（静默超时 → 合成诊断）
//! - 运行计数
//!
//! # 使用场景
//!
//! 适用于需要直接掌控传输与线程生命周期的场景。
//! 大多数用户应该使用 `humanoid-client` 提供的 `Humanoid` 门面。

mod driver;
mod error;
pub mod heartbeat;
pub mod hooks;
pub mod metrics;
pub mod pipeline;
pub mod state;

pub use driver::Driver;
pub use error::DriverError;
pub use heartbeat::ConnectionMonitor;
pub use hooks::{Callback, HookRegistry};
pub use metrics::{DriverMetrics, MetricsSnapshot};
pub use pipeline::{PipelineConfig, client_stamp_ns};
pub use state::SharedState;
