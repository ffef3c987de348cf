//! 订阅回调注册表
//!
//! 按主题（IMU / 状态 / 摇杆 / 诊断）维护回调列表，RX 线程在提交快照后
//! 依注册顺序逐一触发。
//!
//! # 回调契约
//!
//! - 回调在 RX 线程上同步执行，必须足够快且不可阻塞
//!   （需要重活请通过 channel 转发到自己的线程）
//! - 数据以 `Arc<T>` 传递，回调可零拷贝持有
//! - 同一主题内的触发顺序 == 数据报到达顺序；不同主题之间无顺序保证
//!
//! # 实现
//!
//! 列表存放在 `ArcSwap<Vec<...>>` 中：触发侧 wait-free 读取，
//! 注册侧以 RCU 方式换入新列表（注册是低频操作）。

use std::sync::Arc;

use arc_swap::ArcSwap;
use humanoid_protocol::{DiagnosticValue, ImuData, RobotState, SensorJoy};

/// 单主题回调类型
pub type Callback<T> = Arc<dyn Fn(Arc<T>) + Send + Sync>;

/// 单主题回调列表
struct Topic<T> {
    callbacks: ArcSwap<Vec<Callback<T>>>,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self {
            callbacks: ArcSwap::from_pointee(Vec::new()),
        }
    }
}

impl<T> Topic<T> {
    fn add(&self, cb: Callback<T>) {
        self.callbacks.rcu(|old| {
            let mut next = Vec::with_capacity(old.len() + 1);
            next.extend(old.iter().cloned());
            next.push(cb.clone());
            next
        });
    }

    fn dispatch(&self, data: Arc<T>) {
        for cb in self.callbacks.load().iter() {
            cb(Arc::clone(&data));
        }
    }

    fn len(&self) -> usize {
        self.callbacks.load().len()
    }
}

/// 订阅回调注册表
///
/// 在客户端与驱动之间共享（`Arc<HookRegistry>`），注册先于或晚于
/// `init` 均可。
#[derive(Default)]
pub struct HookRegistry {
    imu: Topic<ImuData>,
    robot_state: Topic<RobotState>,
    joy: Topic<SensorJoy>,
    diagnostic: Topic<DiagnosticValue>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_imu(&self, cb: impl Fn(Arc<ImuData>) + Send + Sync + 'static) {
        self.imu.add(Arc::new(cb));
    }

    pub fn add_robot_state(&self, cb: impl Fn(Arc<RobotState>) + Send + Sync + 'static) {
        self.robot_state.add(Arc::new(cb));
    }

    pub fn add_sensor_joy(&self, cb: impl Fn(Arc<SensorJoy>) + Send + Sync + 'static) {
        self.joy.add(Arc::new(cb));
    }

    pub fn add_diagnostic(&self, cb: impl Fn(Arc<DiagnosticValue>) + Send + Sync + 'static) {
        self.diagnostic.add(Arc::new(cb));
    }

    /// 已注册的诊断回调数量（用于日志与测试）
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostic.len()
    }

    pub fn dispatch_imu(&self, data: Arc<ImuData>) {
        self.imu.dispatch(data);
    }

    pub fn dispatch_robot_state(&self, data: Arc<RobotState>) {
        self.robot_state.dispatch(data);
    }

    pub fn dispatch_sensor_joy(&self, data: Arc<SensorJoy>) {
        self.joy.dispatch(data);
    }

    pub fn dispatch_diagnostic(&self, data: Arc<DiagnosticValue>) {
        self.diagnostic.dispatch(data);
    }
}
