//! # Painter Protocol
//!
//! JAKA 控制器 TCP 文本协议的编解码（无 I/O 依赖）
//!
//! ## 模块
//!
//! - `names`: 指令名、字段名和默认端口常量
//! - `command`: 指令编码
//! - `frame`: 按花括号配对切分字节流
//! - `reply`: 回复解码和类型化字段读取
//!
//! ## 线格式
//!
//! ```text
//! → {"cmdName":"moveL","jointPosition":[x,y,z,rx,ry,rz],"speed":50,"accel":100,"relFlag":0}
//! ← {"cmdName":"moveL","errorCode":"0","errorMsg":""}
//! ```
//!
//! 协议不带请求 ID，也没有长度前缀，因此指令通道只能单发单收。

pub mod command;
pub mod frame;
pub mod names;
pub mod reply;

pub use command::{Command, ParamValue};
pub use frame::{DEFAULT_MAX_FRAME_LEN, FrameDecoder};
pub use names::{DEFAULT_COMMAND_PORT, DEFAULT_STATUS_PORT, ERROR_CODE_OK, cmd, field};
pub use reply::RawReply;

use thiserror::Error;

/// 协议层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field {field}: expected {expected}")]
    InvalidField { field: String, expected: String },

    #[error("Non-finite number in field {field}")]
    NonFiniteNumber { field: String },

    #[error("Frame exceeds {limit} bytes without a closing brace")]
    FrameTooLarge { limit: usize },
}

impl ProtocolError {
    pub(crate) fn missing(field: &str) -> Self {
        ProtocolError::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, expected: &str) -> Self {
        ProtocolError::InvalidField {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }
}
