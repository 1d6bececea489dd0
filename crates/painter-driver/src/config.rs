//! 连接配置
//!
//! `LinkConfig` 可以直接构造、用 `Default` 取默认值，或从 TOML 文件加载：
//!
//! ```toml
//! host = "192.168.1.100"
//! command_port = 10001
//! status_port = 10000
//! connect_timeout_ms = 3000
//! read_timeout_ms = 5000
//! settle_delay_ms = 50
//! status_queue_capacity = 16
//! ```
//!
//! 缺省的字段取默认值。

use painter_protocol::{DEFAULT_COMMAND_PORT, DEFAULT_STATUS_PORT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置文件错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 机械臂连接配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// 控制器地址
    pub host: String,
    /// 指令通道端口
    pub command_port: u16,
    /// 状态通道端口
    pub status_port: u16,
    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,
    /// 等待回复/遥测的超时（毫秒）
    pub read_timeout_ms: u64,
    /// 发送指令后到读取回复前的固定等待（毫秒）
    pub settle_delay_ms: u64,
    /// 遥测队列容量（满时丢弃最旧的一帧）
    pub status_queue_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: String::from("192.168.1.100"),
            command_port: DEFAULT_COMMAND_PORT,
            status_port: DEFAULT_STATUS_PORT,
            connect_timeout_ms: 3000,
            read_timeout_ms: 5000,
            settle_delay_ms: 50,
            status_queue_capacity: 16,
        }
    }
}

impl LinkConfig {
    /// 使用指定地址和默认端口
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LinkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host",
                reason: "must not be empty".to_string(),
            });
        }
        if self.command_port == self.status_port {
            return Err(ConfigError::Invalid {
                field: "status_port",
                reason: format!("must differ from command_port ({})", self.command_port),
            });
        }
        if self.status_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "status_queue_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.command_port, 10001);
        assert_eq!(config.status_port, 10000);
        assert_eq!(config.settle_delay(), Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = LinkConfig::from_toml_str(
            r#"
            host = "10.0.0.7"
            read_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.command_port, 10001);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = LinkConfig::from_toml_str("command_port = 7\nstatus_port = 7").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "status_port", .. }));

        let err = LinkConfig::from_toml_str("host = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "host", .. }));

        assert!(matches!(
            LinkConfig::from_toml_str("command_port = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.toml");

        let mut config = LinkConfig::with_host("127.0.0.1");
        config.settle_delay_ms = 5;
        config.save_to_file(&path).unwrap();

        let loaded = LinkConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
