//! 回复解码
//!
//! 指令通道的每个回复至少包含 `cmdName`、`errorCode`、`errorMsg`，
//! 外加与指令相关的字段；状态通道的遥测帧格式相同但不保证带这三个字段。

use crate::ProtocolError;
use crate::names::{ERROR_CODE_OK, field};
use serde_json::{Map, Value};

/// 已解码的回复
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    cmd_name: String,
    error_code: String,
    error_msg: String,
    fields: Map<String, Value>,
    raw: String,
}

impl RawReply {
    /// 解码指令通道回复
    ///
    /// # 错误
    ///
    /// - 不是 JSON 对象：[`ProtocolError::Malformed`]
    /// - 缺少 `cmdName` 或 `errorCode`：[`ProtocolError::MissingField`]
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let reply = Self::parse(text)?;
        if !reply.fields.contains_key(field::CMD_NAME) {
            return Err(ProtocolError::missing(field::CMD_NAME));
        }
        if !reply.fields.contains_key(field::ERROR_CODE) {
            return Err(ProtocolError::missing(field::ERROR_CODE));
        }
        Ok(reply)
    }

    /// 解码状态通道遥测帧（不要求 `cmdName`/`errorCode`）
    pub fn decode_telemetry(text: &str) -> Result<Self, ProtocolError> {
        Self::parse(text)
    }

    fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ProtocolError::Malformed(format!("invalid JSON: {}", e)))?;
        let Value::Object(fields) = value else {
            return Err(ProtocolError::Malformed(
                "top-level value is not an object".to_string(),
            ));
        };

        let cmd_name = scalar_text(fields.get(field::CMD_NAME)).unwrap_or_default();
        let error_code =
            scalar_text(fields.get(field::ERROR_CODE)).unwrap_or_else(|| ERROR_CODE_OK.to_string());
        let error_msg = scalar_text(fields.get(field::ERROR_MSG)).unwrap_or_default();

        Ok(RawReply {
            cmd_name,
            error_code,
            error_msg,
            fields,
            raw: text.to_string(),
        })
    }

    /// 回显的指令名（遥测帧为空字符串）
    pub fn cmd_name(&self) -> &str {
        &self.cmd_name
    }

    /// 错误码（按文本保存，`"0"` 表示成功）
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// 错误信息
    pub fn error_msg(&self) -> &str {
        &self.error_msg
    }

    /// 原始文本
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 错误码是否为 0
    pub fn is_success(&self) -> bool {
        self.error_code.trim() == ERROR_CODE_OK
    }

    /// 是否包含字段
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// 原始字段值
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn require(&self, key: &str) -> Result<&Value, ProtocolError> {
        self.fields.get(key).ok_or_else(|| ProtocolError::missing(key))
    }

    /// 读取数字字段
    pub fn get_f64(&self, key: &str) -> Result<f64, ProtocolError> {
        number(self.require(key)?).ok_or_else(|| ProtocolError::invalid(key, "number"))
    }

    /// 读取字符串字段
    pub fn get_str(&self, key: &str) -> Result<&str, ProtocolError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| ProtocolError::invalid(key, "string"))
    }

    /// 读取布尔字段（接受 `true/false` 与 `0/1`）
    pub fn get_bool(&self, key: &str) -> Result<bool, ProtocolError> {
        flag(self.require(key)?).ok_or_else(|| ProtocolError::invalid(key, "boolean"))
    }

    /// 读取数字数组字段
    pub fn get_f64_array(&self, key: &str) -> Result<Vec<f64>, ProtocolError> {
        let items = self
            .require(key)?
            .as_array()
            .ok_or_else(|| ProtocolError::invalid(key, "array of numbers"))?;
        items
            .iter()
            .map(|v| number(v).ok_or_else(|| ProtocolError::invalid(key, "array of numbers")))
            .collect()
    }

    /// 读取定长数字数组字段（如 6 元素位姿）
    pub fn get_f64_array_n<const N: usize>(&self, key: &str) -> Result<[f64; N], ProtocolError> {
        let values = self.get_f64_array(key)?;
        <[f64; N]>::try_from(values.as_slice()).map_err(|_| ProtocolError::InvalidField {
            field: key.to_string(),
            expected: format!("array of {} numbers, got {}", N, values.len()),
        })
    }

    /// 读取布尔数组字段（数字字段非 0 即真）
    pub fn get_bool_array(&self, key: &str) -> Result<Vec<bool>, ProtocolError> {
        let items = self
            .require(key)?
            .as_array()
            .ok_or_else(|| ProtocolError::invalid(key, "array of flags"))?;
        items
            .iter()
            .map(|v| flag(v).ok_or_else(|| ProtocolError::invalid(key, "array of flags")))
            .collect()
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_DATA_REPLY: &str = r#"{"cmdName":"get_data","errorCode":"0","errorMsg":"",
        "joint_actual_position":[0,90,-90,0,90,0],
        "actual_position":[400.5,-12,300,180,0,90],
        "din":[1,0,0,1],"ain":[2.5,"0.75"]}"#;

    #[test]
    fn test_decode_success() {
        let reply =
            RawReply::decode(r#"{"cmdName":"power_on","errorCode":"0","errorMsg":"none"}"#).unwrap();
        assert_eq!(reply.cmd_name(), "power_on");
        assert_eq!(reply.error_code(), "0");
        assert_eq!(reply.error_msg(), "none");
        assert!(reply.is_success());
    }

    #[test]
    fn test_decode_numeric_error_code() {
        let reply = RawReply::decode(r#"{"cmdName":"moveL","errorCode":2,"errorMsg":"ik fail"}"#)
            .unwrap();
        assert_eq!(reply.error_code(), "2");
        assert!(!reply.is_success());
    }

    #[test]
    fn test_decode_missing_fields() {
        assert_eq!(
            RawReply::decode(r#"{"errorCode":"0"}"#),
            Err(ProtocolError::MissingField {
                field: "cmdName".to_string()
            })
        );
        assert_eq!(
            RawReply::decode(r#"{"cmdName":"x"}"#),
            Err(ProtocolError::MissingField {
                field: "errorCode".to_string()
            })
        );
        // 遥测帧不要求这两个字段
        assert!(RawReply::decode_telemetry(r#"{"ain":[1]}"#).is_ok());
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(RawReply::decode("[1,2]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(RawReply::decode("{broken"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_typed_fields() {
        let reply = RawReply::decode(GET_DATA_REPLY).unwrap();
        let pose: [f64; 6] = reply.get_f64_array_n("actual_position").unwrap();
        assert_eq!(pose, [400.5, -12.0, 300.0, 180.0, 0.0, 90.0]);
        assert_eq!(reply.get_f64_array("ain").unwrap(), vec![2.5, 0.75]);
        assert_eq!(reply.get_bool_array("din").unwrap(), vec![true, false, false, true]);
        assert_eq!(reply.get_str("cmdName").unwrap(), "get_data");
    }

    #[test]
    fn test_typed_field_errors_name_the_key() {
        let reply = RawReply::decode(GET_DATA_REPLY).unwrap();
        let err = reply.get_f64("tcp_speed").unwrap_err();
        assert_eq!(err.to_string(), "Missing field: tcp_speed");

        let err = reply.get_f64_array_n::<3>("actual_position").unwrap_err();
        assert!(err.to_string().contains("actual_position"), "{}", err);

        let err = reply.get_f64("din").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { ref field, .. } if field == "din"));
    }
}
