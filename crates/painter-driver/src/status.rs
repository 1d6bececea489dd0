//! 状态通道
//!
//! 状态通道与指令通道互相独立：后台线程持续读取遥测帧，
//! 把最新值合并进 [`StatusSnapshot`]（`ArcSwap`，无锁读取），
//! 同时把原始帧放进有界队列供 `poll_status` 消费。

use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use painter_geometry::{CartesianPose, JOINT_COUNT, JointAngles};
use painter_protocol::{ProtocolError, RawReply, field};
use painter_transport::{LinkAdapter, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, trace, warn};

/// 最新遥测快照
///
/// 每个字段只在遥测帧包含对应键时更新，缺失的键保留上一次的值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    /// 末端位姿
    pub pose: Option<CartesianPose>,
    /// 关节角
    pub joints: Option<JointAngles>,
    /// 模拟输入
    pub analog_inputs: Vec<f64>,
    /// 数字输入
    pub digital_inputs: Vec<bool>,
    /// 拖动示教是否开启
    pub drag_enabled: Option<bool>,
    /// 是否处于保护性停止
    pub protective_stop: Option<bool>,
    /// 收到的遥测帧总数
    pub frame_count: u64,
    /// 最近一帧的接收时刻
    pub received_at: Option<Instant>,
}

impl StatusSnapshot {
    /// 合并一帧遥测
    ///
    /// 已出现的键若格式错误则返回错误，快照保持不变。
    pub fn merge(&self, reply: &RawReply) -> Result<Self, ProtocolError> {
        let mut next = self.clone();

        if reply.has_field(field::ACTUAL_POSITION) {
            let values: [f64; 6] = reply.get_f64_array_n(field::ACTUAL_POSITION)?;
            next.pose = Some(CartesianPose::from_array(values));
        }
        if reply.has_field(field::JOINT_ACTUAL_POSITION) {
            let values: [f64; JOINT_COUNT] =
                reply.get_f64_array_n(field::JOINT_ACTUAL_POSITION)?;
            next.joints = Some(JointAngles::new(values));
        }
        if reply.has_field(field::AIN) {
            next.analog_inputs = reply.get_f64_array(field::AIN)?;
        }
        if reply.has_field(field::DIN) {
            next.digital_inputs = reply.get_bool_array(field::DIN)?;
        }
        if reply.has_field(field::DRAG_STATUS) {
            next.drag_enabled = Some(reply.get_bool(field::DRAG_STATUS)?);
        }
        if reply.has_field(field::PROTECTIVE_STOP) {
            next.protective_stop = Some(reply.get_bool(field::PROTECTIVE_STOP)?);
        }

        next.frame_count = self.frame_count + 1;
        next.received_at = Some(Instant::now());
        Ok(next)
    }
}

/// 单调时间锚点
static MONITOR_EPOCH: OnceLock<Instant> = OnceLock::new();

fn monotonic_micros() -> u64 {
    let start = MONITOR_EPOCH.get_or_init(Instant::now);
    start.elapsed().as_micros() as u64
}

/// 遥测存活监视
///
/// 记录最近一次收到遥测的时间，判断状态通道是否仍有数据到达。
pub struct ConnectionMonitor {
    last_feedback: AtomicU64,
    timeout: Duration,
}

impl ConnectionMonitor {
    /// 创建监视器（创建时刻视为刚收到一帧）
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_feedback: AtomicU64::new(monotonic_micros()),
            timeout,
        }
    }

    /// 超时窗口内是否收到过遥测
    pub fn check_connection(&self) -> bool {
        self.time_since_last_feedback() < self.timeout
    }

    /// 记录收到一帧遥测
    pub fn register_feedback(&self) {
        self.last_feedback.store(monotonic_micros(), Ordering::Relaxed);
    }

    /// 距离上一帧遥测的时间
    pub fn time_since_last_feedback(&self) -> Duration {
        let last_us = self.last_feedback.load(Ordering::Relaxed);
        Duration::from_micros(monotonic_micros().saturating_sub(last_us))
    }
}

/// 状态通道共享上下文
pub struct StatusContext {
    /// 最新快照（无锁读取）
    pub snapshot: ArcSwap<StatusSnapshot>,
    /// 遥测存活监视
    pub monitor: ConnectionMonitor,
    /// 监听线程是否因连接断开而退出
    pub link_lost: AtomicBool,
    /// 断开原因
    pub lost_reason: Mutex<Option<String>>,
}

impl StatusContext {
    pub fn new(monitor_timeout: Duration) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(StatusSnapshot::default()),
            monitor: ConnectionMonitor::new(monitor_timeout),
            link_lost: AtomicBool::new(false),
            lost_reason: Mutex::new(None),
        }
    }

    fn mark_lost(&self, reason: String) {
        *self.lost_reason.lock() = Some(reason);
        self.link_lost.store(true, Ordering::Release);
    }
}

/// 监听线程单次读取的超时（用于检查退出标志）
pub const LISTENER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 状态通道监听循环
///
/// 遥测队列满时丢弃最旧的一帧，保证 `poll_status` 总能读到最新数据，
/// 监听线程也永远不会因为没人消费而阻塞。
///
/// # 参数
///
/// - `adapter`: 状态通道适配器（移动到监听线程）
/// - `ctx`: 共享上下文
/// - `tx`/`rx`: 遥测队列两端（`rx` 仅用于丢弃最旧帧）
/// - `is_running`: 运行标志，置为 false 后循环在一个轮询周期内退出
pub fn status_loop(
    mut adapter: impl LinkAdapter,
    ctx: Arc<StatusContext>,
    tx: Sender<RawReply>,
    rx: Receiver<RawReply>,
    is_running: Arc<AtomicBool>,
) {
    adapter.set_receive_timeout(Some(LISTENER_POLL_INTERVAL));

    loop {
        if !is_running.load(Ordering::Acquire) {
            trace!("Status listener: is_running flag is false, exiting");
            break;
        }

        let frame = match adapter.receive() {
            Ok(frame) => frame,
            Err(TransportError::Timeout) => continue,
            Err(TransportError::Framing(e)) => {
                warn!("Status channel framing error, buffer discarded: {}", e);
                continue;
            },
            Err(e) => {
                if is_running.load(Ordering::Acquire) {
                    error!("Status listener stopped: {}", e);
                }
                ctx.mark_lost(e.to_string());
                break;
            },
        };

        let reply = match RawReply::decode_telemetry(&frame) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Ignoring unparsable telemetry frame: {}", e);
                continue;
            },
        };

        let current = ctx.snapshot.load();
        match current.merge(&reply) {
            Ok(next) => ctx.snapshot.store(Arc::new(next)),
            Err(e) => warn!("Telemetry frame has malformed field: {}", e),
        }
        ctx.monitor.register_feedback();

        if let Err(TrySendError::Full(reply)) = tx.try_send(reply) {
            let _ = rx.try_recv();
            let _ = tx.try_send(reply);
        }
    }
}
