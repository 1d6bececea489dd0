//! 内存 Mock 适配器
//!
//! `MockAdapter` 交给被测对象，`MockHandle` 留在测试代码中用来
//! 预置回复、检查已发送的帧或模拟断线。

use crate::{LinkAdapter, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

#[derive(Default)]
struct Shared {
    receive_queue: VecDeque<String>,
    sent_frames: Vec<String>,
    closed: bool,
    responder: Option<Responder>,
}

/// 队列驱动的 `LinkAdapter`
pub struct MockAdapter {
    shared: Arc<Mutex<Shared>>,
    receive_delay: Duration,
}

/// 测试侧句柄
#[derive(Clone)]
pub struct MockHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MockAdapter {
    /// 创建适配器和对应的句柄
    pub fn pair() -> (Self, MockHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            MockAdapter {
                shared: shared.clone(),
                receive_delay: Duration::from_millis(1),
            },
            MockHandle { shared },
        )
    }

    /// 队列为空时 `receive` 在返回 `Timeout` 前等待的时长
    pub fn with_receive_delay(mut self, delay: Duration) -> Self {
        self.receive_delay = delay;
        self
    }
}

impl MockHandle {
    /// 预置一帧回复
    pub fn queue_reply(&self, frame: impl Into<String>) {
        self.shared.lock().receive_queue.push_back(frame.into());
    }

    /// 每次 `send` 时调用，返回值（若有）进入接收队列
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        self.shared.lock().responder = Some(Box::new(responder));
    }

    /// 取出并清空已发送的帧
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.shared.lock().sent_frames)
    }

    /// 尚未被读取的回复数
    pub fn pending_replies(&self) -> usize {
        self.shared.lock().receive_queue.len()
    }

    /// 模拟对端关闭连接
    pub fn close(&self) {
        self.shared.lock().closed = true;
    }
}

impl LinkAdapter for MockAdapter {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        let mut shared = self.shared.lock();
        if shared.closed {
            return Err(TransportError::Closed);
        }
        shared.sent_frames.push(frame.to_string());
        if let Some(reply) = shared.responder.as_mut().and_then(|r| r(frame)) {
            shared.receive_queue.push_back(reply);
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<String, TransportError> {
        {
            let mut shared = self.shared.lock();
            if let Some(frame) = shared.receive_queue.pop_front() {
                return Ok(frame);
            }
            if shared.closed {
                return Err(TransportError::Closed);
            }
        }
        // 避免调用方在空队列上忙等
        std::thread::sleep(self.receive_delay);
        Err(TransportError::Timeout)
    }

    fn peer(&self) -> String {
        String::from("mock")
    }
}
