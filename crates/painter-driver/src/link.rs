//! Robot Link
//!
//! 对外的 [`RobotLink`]：一条指令通道（同步、单发单收）加一条状态通道
//! （后台线程读取），两者互不阻塞。
//!
//! 协议回复不带请求 ID，因此指令通道上同一时刻只能有一条指令在途：
//! `execute` 在整个"发送 → 等待 → 读取"过程中持有指令通道锁，
//! 多个线程并发调用会被串行化。
//!
//! 等待超时或回复指令名不匹配后，迟到的回复可能仍留在通道里。
//! 此时通道被标记为失步，下一次发送前先丢弃所有未读帧。

use crate::config::LinkConfig;
use crate::error::{Channel, LinkError};
use crate::hooks::{HookManager, ReplyCallback, SubscriptionId};
use crate::status::{StatusContext, StatusSnapshot, status_loop};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use painter_protocol::{Command, RawReply};
use painter_transport::LinkAdapter;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 指令通道（受互斥锁保护）
struct CommandChannel {
    adapter: Box<dyn LinkAdapter + Send>,
    last_reply: Option<RawReply>,
    desynced: bool,
}

/// 时序参数
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkTiming {
    pub read_timeout: Duration,
    pub settle_delay: Duration,
}

impl From<&LinkConfig> for LinkTiming {
    fn from(config: &LinkConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            settle_delay: config.settle_delay(),
        }
    }
}

/// 机械臂连接
///
/// 创建时两条通道都已连接；生命周期内不会自动重连，
/// 传输错误以 `LinkLost` 返回给调用方。Drop 时停止并 join 状态监听线程。
pub struct RobotLink {
    command: Mutex<CommandChannel>,
    hooks: RwLock<HookManager>,
    status_ctx: Arc<StatusContext>,
    status_rx: Receiver<RawReply>,
    status_thread: Option<JoinHandle<()>>,
    is_running: Arc<AtomicBool>,
    timing: LinkTiming,
    pub(crate) grip_engaged: AtomicBool,
    peer: String,
}

impl RobotLink {
    /// 用两个已连接的适配器创建连接
    ///
    /// # 参数
    ///
    /// - `command`: 指令通道适配器
    /// - `status`: 状态通道适配器（移动到监听线程）
    /// - `config`: 超时、等待时间和遥测队列容量
    ///
    /// # 错误
    ///
    /// - `LinkError::Config`: 配置取值非法
    /// - `LinkError::Spawn`: 监听线程启动失败
    pub fn new<C, S>(command: C, status: S, config: &LinkConfig) -> Result<Self, LinkError>
    where
        C: LinkAdapter + Send + 'static,
        S: LinkAdapter + Send + 'static,
    {
        config.validate()?;

        let peer = command.peer();
        let (status_tx, status_rx) = crossbeam_channel::bounded(config.status_queue_capacity);
        let status_ctx = Arc::new(StatusContext::new(config.read_timeout()));
        let is_running = Arc::new(AtomicBool::new(true));

        let thread_ctx = status_ctx.clone();
        let thread_rx = status_rx.clone();
        let thread_running = is_running.clone();
        let status_thread = std::thread::Builder::new()
            .name("painter-status".to_string())
            .spawn(move || status_loop(status, thread_ctx, status_tx, thread_rx, thread_running))
            .map_err(LinkError::Spawn)?;

        info!("Robot link ready ({})", peer);

        Ok(Self {
            command: Mutex::new(CommandChannel {
                adapter: Box::new(command),
                last_reply: None,
                desynced: false,
            }),
            hooks: RwLock::new(HookManager::new()),
            status_ctx,
            status_rx,
            status_thread: Some(status_thread),
            is_running,
            timing: LinkTiming::from(config),
            grip_engaged: AtomicBool::new(false),
            peer,
        })
    }

    /// 对端描述
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// 编码并发送指令，不等待回复
    ///
    /// 与 [`await_reply`](Self::await_reply) 配对使用时，调用方需自行保证
    /// 两者之间没有其他线程插入指令；一般直接使用 [`execute`](Self::execute)。
    pub fn send_command(&self, command: &Command) -> Result<(), LinkError> {
        let frame = command.encode()?;
        let mut channel = self.command.lock();
        self.send_locked(&mut channel, &frame)
    }

    /// 阻塞读取指令通道上的下一个回复（带超时）
    pub fn await_reply(&self) -> Result<RawReply, LinkError> {
        let mut channel = self.command.lock();
        self.await_locked(&mut channel)
    }

    /// 发送指令、等待固定时长、读取回复
    ///
    /// 回复解码成功后广播给所有订阅者；错误码非零时返回
    /// `LinkError::RobotFault`。
    ///
    /// # 错误
    ///
    /// - `ProtocolDecode`: 参数无法编码或回复缺少字段
    /// - `LinkTimeout`: 超时未收到完整回复
    /// - `LinkLost`: 连接已断开
    /// - `UnexpectedReply`: 回复的指令名与发出的不一致
    /// - `RobotFault`: 控制器返回非零错误码
    pub fn execute(&self, command: &Command) -> Result<RawReply, LinkError> {
        // 参数校验在任何网络往返之前完成
        let frame = command.encode()?;

        let reply = {
            let mut channel = self.command.lock();
            self.send_locked(&mut channel, &frame)?;
            if !self.timing.settle_delay.is_zero() {
                spin_sleep::sleep(self.timing.settle_delay);
            }
            let reply = self.await_locked(&mut channel)?;
            if reply.cmd_name() != command.name() {
                channel.desynced = true;
            }
            reply
        };

        self.hooks.read().trigger_all(&reply);

        if reply.cmd_name() != command.name() {
            warn!(
                "Reply desync: sent '{}', received '{}'",
                command.name(),
                reply.cmd_name()
            );
            return Err(LinkError::UnexpectedReply {
                expected: command.name().to_string(),
                actual: reply.cmd_name().to_string(),
            });
        }

        if !reply.is_success() {
            warn!(
                "Command '{}' failed: code {} ({})",
                command.name(),
                reply.error_code(),
                reply.error_msg()
            );
            return Err(LinkError::RobotFault {
                command: command.name().to_string(),
                code: reply.error_code().to_string(),
                message: reply.error_msg().to_string(),
            });
        }

        Ok(reply)
    }

    /// 按指令名执行不带参数的指令
    pub fn execute_named(&self, name: &str) -> Result<RawReply, LinkError> {
        self.execute(&Command::new(name))
    }

    /// 最近一次指令回复
    pub fn last_reply(&self) -> Option<RawReply> {
        self.command.lock().last_reply.clone()
    }

    /// 阻塞读取下一帧遥测（超时为配置的读超时）
    pub fn poll_status(&self) -> Result<RawReply, LinkError> {
        self.poll_status_timeout(self.timing.read_timeout)
    }

    /// 阻塞读取下一帧遥测
    ///
    /// # 错误
    ///
    /// - `LinkTimeout`: 超时内没有新遥测
    /// - `LinkLost`: 状态通道已断开且队列已取空
    pub fn poll_status_timeout(&self, timeout: Duration) -> Result<RawReply, LinkError> {
        match self.status_rx.recv_timeout(timeout) {
            Ok(reply) => Ok(reply),
            Err(RecvTimeoutError::Timeout) => {
                if self.status_ctx.link_lost.load(Ordering::Acquire) {
                    Err(self.status_lost_error())
                } else {
                    Err(LinkError::LinkTimeout {
                        channel: Channel::Status,
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }
            },
            Err(RecvTimeoutError::Disconnected) => Err(self.status_lost_error()),
        }
    }

    /// 最新遥测快照（无锁读取）
    pub fn latest_status(&self) -> StatusSnapshot {
        self.status_ctx.snapshot.load().as_ref().clone()
    }

    /// 读超时窗口内是否收到过遥测
    pub fn is_status_alive(&self) -> bool {
        !self.status_ctx.link_lost.load(Ordering::Acquire)
            && self.status_ctx.monitor.check_connection()
    }

    /// 距离上一帧遥测的时间
    pub fn time_since_last_status(&self) -> Duration {
        self.status_ctx.monitor.time_since_last_feedback()
    }

    /// 订阅指令回复
    pub fn subscribe_debug(&self, callback: Arc<dyn ReplyCallback>) -> SubscriptionId {
        self.hooks.write().subscribe(callback)
    }

    /// 取消订阅，返回是否找到该订阅
    pub fn unsubscribe_debug(&self, id: SubscriptionId) -> bool {
        self.hooks.write().unsubscribe(id)
    }

    fn send_locked(&self, channel: &mut CommandChannel, frame: &str) -> Result<(), LinkError> {
        if channel.desynced {
            self.resync_locked(channel)?;
        }
        debug!("→ {}", frame);
        channel
            .adapter
            .send(frame)
            .map_err(|e| LinkError::from_transport(e, Channel::Command, self.read_timeout_ms()))
    }

    fn await_locked(&self, channel: &mut CommandChannel) -> Result<RawReply, LinkError> {
        let frame = match channel.adapter.receive_timeout(self.timing.read_timeout) {
            Ok(frame) => frame,
            Err(e) => {
                channel.desynced = true;
                return Err(LinkError::from_transport(
                    e,
                    Channel::Command,
                    self.read_timeout_ms(),
                ));
            },
        };
        debug!("← {}", frame);
        let reply = RawReply::decode(&frame)?;
        channel.last_reply = Some(reply.clone());
        Ok(reply)
    }

    /// 丢弃失步期间到达的回复
    fn resync_locked(&self, channel: &mut CommandChannel) -> Result<(), LinkError> {
        let discarded = channel
            .adapter
            .discard_pending()
            .map_err(|e| LinkError::from_transport(e, Channel::Command, self.read_timeout_ms()))?;
        if discarded > 0 {
            warn!("Discarded {} stale replies from {}", discarded, self.peer);
        }
        channel.desynced = false;
        Ok(())
    }

    fn status_lost_error(&self) -> LinkError {
        let reason = self
            .status_ctx
            .lost_reason
            .lock()
            .clone()
            .unwrap_or_else(|| String::from("status listener stopped"));
        LinkError::LinkLost {
            channel: Channel::Status,
            reason,
        }
    }

    fn read_timeout_ms(&self) -> u64 {
        self.timing.read_timeout.as_millis() as u64
    }
}

impl fmt::Debug for RobotLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotLink")
            .field("peer", &self.peer)
            .field("is_running", &self.is_running.load(Ordering::Relaxed))
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl Drop for RobotLink {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
        if let Some(handle) = self.status_thread.take()
            && handle.join().is_err()
        {
            warn!("Status listener thread panicked");
        }
        debug!("Robot link to {} closed", self.peer);
    }
}
