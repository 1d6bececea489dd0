//! 帧切分
//!
//! 协议没有长度前缀，也没有分隔符，唯一的帧边界就是 JSON 对象的花括号。
//! [`FrameDecoder`] 在累积的字节流中做括号配对（跳过字符串字面量内的括号
//! 和转义字符），一次取出一个完整对象。

use crate::ProtocolError;
use bytes::{Buf, BytesMut};

/// 默认单帧上限
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// 流式帧解码器
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    max_frame_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        FrameDecoder::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameDecoder {
    /// 创建解码器
    ///
    /// # 参数
    ///
    /// - `max_frame_len`: 未闭合对象允许累积的最大字节数
    pub fn new(max_frame_len: usize) -> Self {
        FrameDecoder {
            buffer: BytesMut::with_capacity(2048),
            max_frame_len,
        }
    }

    /// 追加收到的字节
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// 缓冲区中尚未成帧的字节数
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// 丢弃所有缓冲数据
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// 取出下一个完整帧
    ///
    /// 返回 `Ok(None)` 表示需要更多字节。对象起始 `{` 之前的字节被丢弃。
    ///
    /// # 错误
    ///
    /// - [`ProtocolError::FrameTooLarge`]: 累积超过上限仍未闭合（缓冲区被清空）
    /// - [`ProtocolError::Malformed`]: 帧不是合法 UTF-8
    pub fn next_frame(&mut self) -> Result<Option<String>, ProtocolError> {
        match self.buffer.iter().position(|b| *b == b'{') {
            Some(start) => self.buffer.advance(start),
            None => {
                self.buffer.clear();
                return Ok(None);
            },
        }

        let Some(end) = find_object_end(&self.buffer) else {
            if self.buffer.len() > self.max_frame_len {
                self.buffer.clear();
                return Err(ProtocolError::FrameTooLarge {
                    limit: self.max_frame_len,
                });
            }
            return Ok(None);
        };

        let frame = self.buffer.split_to(end + 1).freeze();
        String::from_utf8(frame.to_vec())
            .map(Some)
            .map_err(|e| ProtocolError::Malformed(format!("frame is not UTF-8: {}", e)))
    }
}

/// 返回与首字节 `{` 配对的 `}` 的下标
fn find_object_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            },
            _ => {},
        }
    }
    None
}
