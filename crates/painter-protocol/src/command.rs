//! 指令编码
//!
//! 线格式为单个扁平文本对象：`{"cmdName":"<name>"[,"<key>":<value>]*}`。
//! 值只有数字、一层数组或字符串三种形式，数字一律使用与区域设置无关的
//! 十进制表示（Rust `f64` 的 `Display` 从不输出千分位或逗号小数点）。

use crate::ProtocolError;
use crate::names::field;
use bytes::Bytes;
use smallvec::SmallVec;
use std::fmt::Write;

/// 指令参数值
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// 浮点数
    Number(f64),
    /// 整数（标志位、索引）
    Integer(i64),
    /// 一层浮点数组（位姿、关节角）
    Array(SmallVec<[f64; 6]>),
    /// 字符串（编码时加引号并转义）
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u8> for ParamValue {
    fn from(value: u8) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<&[f64]> for ParamValue {
    fn from(values: &[f64]) -> Self {
        ParamValue::Array(SmallVec::from_slice(values))
    }
}

impl<const N: usize> From<[f64; N]> for ParamValue {
    fn from(values: [f64; N]) -> Self {
        ParamValue::Array(SmallVec::from_slice(&values))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// 待发送的指令
///
/// 参数保持插入顺序。
///
/// # Example
///
/// ```rust
/// use painter_protocol::Command;
///
/// let cmd = Command::new("moveL")
///     .param("jointPosition", [10.0, 20.5, 30.0, 180.0, 0.0, 0.0])
///     .param("speed", 50.0)
///     .param("relFlag", 1i64);
/// assert_eq!(
///     cmd.encode().unwrap(),
///     r#"{"cmdName":"moveL","jointPosition":[10,20.5,30,180,0,0],"speed":50,"relFlag":1}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    params: SmallVec<[(String, ParamValue); 4]>,
}

impl Command {
    /// 创建不带参数的指令
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            params: SmallVec::new(),
        }
    }

    /// 追加参数（链式）
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// 指令名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 参数列表（按插入顺序）
    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    /// 编码为线格式文本
    ///
    /// # 错误
    ///
    /// 参数包含 NaN 或无穷大时返回 [`ProtocolError::NonFiniteNumber`]，
    /// 这类值没有合法的文本表示，发出去只会让控制器解析失败。
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let mut out = String::with_capacity(32 + self.params.len() * 16);
        out.push('{');
        write_string(&mut out, field::CMD_NAME);
        out.push(':');
        write_string(&mut out, &self.name);

        for (key, value) in &self.params {
            out.push(',');
            write_string(&mut out, key);
            out.push(':');
            match value {
                ParamValue::Number(v) => write_number(&mut out, key, *v)?,
                ParamValue::Integer(v) => {
                    let _ = write!(out, "{}", v);
                },
                ParamValue::Array(values) => {
                    out.push('[');
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        write_number(&mut out, key, *v)?;
                    }
                    out.push(']');
                },
                ParamValue::Text(text) => write_string(&mut out, text),
            }
        }

        out.push('}');
        Ok(out)
    }

    /// 编码为待发送的字节
    pub fn to_bytes(&self) -> Result<Bytes, ProtocolError> {
        Ok(Bytes::from(self.encode()?))
    }
}

fn write_number(out: &mut String, key: &str, value: f64) -> Result<(), ProtocolError> {
    if !value.is_finite() {
        return Err(ProtocolError::NonFiniteNumber {
            field: key.to_string(),
        });
    }
    let _ = write!(out, "{}", value);
    Ok(())
}

fn write_string(out: &mut String, text: &str) {
    // serde_json 对字符串的序列化不会失败
    match serde_json::to_string(text) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => {
            out.push('"');
            out.push('"');
        },
    }
}
