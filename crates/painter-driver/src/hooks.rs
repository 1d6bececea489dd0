//! 回复订阅（Debug Feedback）
//!
//! 每次 `execute` 完成后，解码好的回复会广播给所有订阅者。
//! 回调在完成指令的线程上同步执行：慢回调会推迟下一条指令。
//! 需要解耦时使用 [`ChannelForwarder`]，把回复 `try_send` 到有界通道，
//! 由单独的线程消费。
//!
//! # 使用示例
//!
//! ```rust
//! use painter_driver::hooks::{HookManager, ReplyCallback, TracingReplyLogger};
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let id = hooks.subscribe(Arc::new(TracingReplyLogger));
//! assert_eq!(hooks.len(), 1);
//! assert!(hooks.unsubscribe(id));
//! assert!(hooks.is_empty());
//! ```

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use painter_protocol::RawReply;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// 回复回调 Trait
pub trait ReplyCallback: Send + Sync {
    /// 指令完成（回复已解码）时调用
    ///
    /// 错误码非零的回复同样会送达，随后 `execute` 才返回 `RobotFault`。
    fn on_reply(&self, reply: &RawReply);
}

impl<F> ReplyCallback for F
where
    F: Fn(&RawReply) + Send + Sync,
{
    fn on_reply(&self, reply: &RawReply) {
        self(reply)
    }
}

/// 订阅句柄，用于取消订阅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，需要外部同步（`RobotLink` 内部用 `RwLock` 包装）。
pub struct HookManager {
    callbacks: Vec<(SubscriptionId, Arc<dyn ReplyCallback>)>,
    next_id: AtomicU64,
}

impl HookManager {
    /// 创建新的钩子管理器
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// 添加订阅者
    pub fn subscribe(&mut self, callback: Arc<dyn ReplyCallback>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.push((id, callback));
        id
    }

    /// 取消订阅，返回是否找到该订阅
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// 移除所有订阅者
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 向所有订阅者广播（每个订阅者每个事件最多收到一次）
    pub fn trigger_all(&self, reply: &RawReply) {
        for (_, callback) in &self.callbacks {
            callback.on_reply(reply);
        }
    }

    /// 订阅者数量
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// 是否没有订阅者
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 把每个回复写入 `tracing::debug!` 的订阅者
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReplyLogger;

impl ReplyCallback for TracingReplyLogger {
    fn on_reply(&self, reply: &RawReply) {
        debug!(
            cmd = reply.cmd_name(),
            code = reply.error_code(),
            "Reply: {}",
            reply.raw()
        );
    }
}

/// 把回复转发到有界通道的订阅者（非阻塞，通道满时丢弃）
pub struct ChannelForwarder {
    sender: Sender<RawReply>,
    dropped: AtomicU64,
}

impl ChannelForwarder {
    /// 创建转发器和接收端
    pub fn new(capacity: usize) -> (Self, Receiver<RawReply>) {
        let (sender, receiver) = bounded(capacity);
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            receiver,
        )
    }

    /// 因通道满或接收端关闭而丢弃的回复数
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ReplyCallback for ChannelForwarder {
    fn on_reply(&self, reply: &RawReply) {
        match self.sender.try_send(reply.clone()) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn reply(name: &str) -> RawReply {
        RawReply::decode(&format!(
            r#"{{"cmdName":"{}","errorCode":"0","errorMsg":""}}"#,
            name
        ))
        .unwrap()
    }

    #[test]
    fn test_subscribe_and_trigger() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let mut hooks = HookManager::new();
        hooks.subscribe(Arc::new(move |_: &RawReply| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        hooks.subscribe(Arc::new(TracingReplyLogger));

        hooks.trigger_all(&reply("power_on"));
        hooks.trigger_all(&reply("power_off"));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let mut hooks = HookManager::new();
        let id = hooks.subscribe(Arc::new(move |_: &RawReply| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(hooks.unsubscribe(id));
        // 重复取消返回 false
        assert!(!hooks.unsubscribe(id));

        hooks.trigger_all(&reply("power_on"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut hooks = HookManager::new();
        let a = hooks.subscribe(Arc::new(TracingReplyLogger));
        let b = hooks.subscribe(Arc::new(TracingReplyLogger));
        assert_ne!(a, b);
        hooks.clear();
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_channel_forwarder_drops_when_full() {
        let (forwarder, rx) = ChannelForwarder::new(1);
        forwarder.on_reply(&reply("a"));
        forwarder.on_reply(&reply("b"));
        assert_eq!(forwarder.dropped_count(), 1);
        assert_eq!(rx.try_recv().unwrap().cmd_name(), "a");
    }
}
