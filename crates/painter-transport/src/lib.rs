//! # Painter Transport Layer
//!
//! 字节流抽象层：把"发送一帧文本 / 取出一帧完整文本"统一成 [`LinkAdapter`] trait，
//! 上层驱动不关心底层是真实 TCP 连接还是测试用的内存队列。
//!
//! 帧边界由 `painter_protocol::FrameDecoder` 按花括号配对确定。

use std::time::Duration;
use thiserror::Error;

pub use painter_protocol::ProtocolError;

pub mod tcp;

pub use tcp::TcpAdapter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockAdapter, MockHandle};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Framing error: {0}")]
    Framing(#[from] ProtocolError),
    #[error("Read timeout")]
    Timeout,
    #[error("Connection closed by peer")]
    Closed,
}

impl TransportError {
    /// 连接是否已不可用（需要上层重新建立连接）
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, TransportError::Io(_) | TransportError::Closed)
    }
}

/// 文本帧适配器
///
/// 每次 `receive` 返回恰好一个完整的 JSON 对象文本。
pub trait LinkAdapter {
    fn send(&mut self, frame: &str) -> Result<(), TransportError>;
    fn receive(&mut self) -> Result<String, TransportError>;
    fn set_receive_timeout(&mut self, _timeout: Option<Duration>) {}
    fn receive_timeout(&mut self, timeout: Duration) -> Result<String, TransportError> {
        self.set_receive_timeout(Some(timeout));
        self.receive()
    }
    fn try_receive(&mut self) -> Result<Option<String>, TransportError> {
        match self.receive_timeout(Duration::from_millis(1)) {
            Ok(frame) => Ok(Some(frame)),
            Err(TransportError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
    /// 丢弃已到达但尚未读取的帧，返回丢弃的帧数
    fn discard_pending(&mut self) -> Result<usize, TransportError> {
        let mut discarded = 0;
        while self.try_receive()?.is_some() {
            discarded += 1;
        }
        Ok(discarded)
    }
    /// 对端描述（用于日志）
    fn peer(&self) -> String {
        String::from("<unknown>")
    }
}

impl<T: LinkAdapter + ?Sized> LinkAdapter for Box<T> {
    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn receive(&mut self) -> Result<String, TransportError> {
        (**self).receive()
    }

    fn set_receive_timeout(&mut self, timeout: Option<Duration>) {
        (**self).set_receive_timeout(timeout)
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<String, TransportError> {
        (**self).receive_timeout(timeout)
    }

    fn try_receive(&mut self) -> Result<Option<String>, TransportError> {
        (**self).try_receive()
    }

    fn discard_pending(&mut self) -> Result<usize, TransportError> {
        (**self).discard_pending()
    }

    fn peer(&self) -> String {
        (**self).peer()
    }
}
