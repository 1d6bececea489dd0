//! 驱动层错误类型定义

use crate::config::ConfigError;
use painter_protocol::ProtocolError;
use painter_transport::TransportError;
use std::fmt;
use thiserror::Error;

/// 连接中的通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// 指令通道（单发单收）
    Command,
    /// 状态通道（异步遥测）
    Status,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Command => write!(f, "command"),
            Channel::Status => write!(f, "status"),
        }
    }
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    /// 建立连接失败（不重试，由调用方决定）
    #[error("Connection to {channel} channel failed: {source}")]
    Connection {
        channel: Channel,
        #[source]
        source: TransportError,
    },

    /// 连接已断开（不会自动重连）
    #[error("Link lost on {channel} channel: {reason}")]
    LinkLost { channel: Channel, reason: String },

    /// 等待回复超时
    #[error("Timed out after {timeout_ms}ms waiting on {channel} channel")]
    LinkTimeout { channel: Channel, timeout_ms: u64 },

    /// 回复缺字段或格式错误
    #[error("Protocol decode error: {0}")]
    ProtocolDecode(#[from] ProtocolError),

    /// 控制器返回非零错误码
    #[error("Robot fault on '{command}': code {code}: {message}")]
    RobotFault {
        command: String,
        code: String,
        message: String,
    },

    /// 回复的指令名与发出的指令不一致（通道失步）
    #[error("Unexpected reply: sent '{expected}', controller answered '{actual}'")]
    UnexpectedReply { expected: String, actual: String },

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 状态监听线程启动失败
    #[error("Failed to spawn status listener: {0}")]
    Spawn(#[source] std::io::Error),
}

impl LinkError {
    /// 把传输层错误归类到对应的驱动层错误
    pub fn from_transport(error: TransportError, channel: Channel, timeout_ms: u64) -> Self {
        match error {
            TransportError::Timeout => LinkError::LinkTimeout {
                channel,
                timeout_ms,
            },
            TransportError::Framing(e) => LinkError::ProtocolDecode(e),
            TransportError::Connect { .. } => LinkError::Connection {
                channel,
                source: error,
            },
            TransportError::Closed | TransportError::Io(_) => LinkError::LinkLost {
                channel,
                reason: error.to_string(),
            },
        }
    }

    /// 是否为致命错误
    ///
    /// 致命错误表示连接已不可用，必须由调用方重新建立。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::LinkLost { .. } | Self::Spawn(_)
        )
    }

    /// 是否可重试
    ///
    /// 可重试错误表示连接仍然可用，重新执行操作可能会成功。
    /// 指令通道超时或回复不匹配后，下一次发送前会先丢弃未读的回复。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LinkTimeout { .. } | Self::UnexpectedReply { .. } | Self::ProtocolDecode(_)
        )
    }

    /// 控制器错误码（仅 `RobotFault`）
    pub fn fault_code(&self) -> Option<&str> {
        match self {
            Self::RobotFault { code, .. } => Some(code),
            _ => None,
        }
    }
}
