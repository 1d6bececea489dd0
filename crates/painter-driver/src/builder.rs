//! Builder 模式实现
//!
//! 提供链式构造 [`RobotLink`] 的便捷方式。

use crate::config::LinkConfig;
use crate::error::{Channel, LinkError};
use crate::link::RobotLink;
use painter_transport::{LinkAdapter, TcpAdapter};
use std::time::Duration;
use tracing::info;

impl RobotLink {
    /// 按配置连接控制器的两个端口
    ///
    /// 两条通道都连接成功后才返回；任一通道失败立即返回
    /// `LinkError::Connection`，不重试。
    pub fn connect(config: &LinkConfig) -> Result<Self, LinkError> {
        config.validate()?;

        let command_addr = (config.host.as_str(), config.command_port);
        let status_addr = (config.host.as_str(), config.status_port);
        info!(
            "Connecting to {} (command :{}, status :{})",
            config.host, config.command_port, config.status_port
        );

        let command = TcpAdapter::connect(command_addr, config.connect_timeout()).map_err(
            |source| LinkError::Connection {
                channel: Channel::Command,
                source,
            },
        )?;

        let status = TcpAdapter::connect(status_addr, config.connect_timeout()).map_err(
            |source| LinkError::Connection {
                channel: Channel::Status,
                source,
            },
        )?;

        RobotLink::new(command, status, config)
    }
}

/// RobotLink Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use painter_driver::RobotLinkBuilder;
/// use std::time::Duration;
///
/// let link = RobotLinkBuilder::new()
///     .host("192.168.1.100")
///     .read_timeout(Duration::from_secs(2))
///     .connect()
///     .unwrap();
/// link.power_on().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RobotLinkBuilder {
    config: LinkConfig,
}

impl RobotLinkBuilder {
    /// 创建新的 Builder（默认配置）
    pub fn new() -> Self {
        Self::default()
    }

    /// 控制器地址
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// 指令通道端口
    pub fn command_port(mut self, port: u16) -> Self {
        self.config.command_port = port;
        self
    }

    /// 状态通道端口
    pub fn status_port(mut self, port: u16) -> Self {
        self.config.status_port = port;
        self
    }

    /// 建立 TCP 连接的超时
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 等待回复/遥测的超时
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 发送指令后读取回复前的等待时间
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// 遥测队列容量
    pub fn status_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.status_queue_capacity = capacity;
        self
    }

    /// 整体替换配置
    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// 当前配置
    pub fn link_config(&self) -> &LinkConfig {
        &self.config
    }

    /// 通过 TCP 连接
    pub fn connect(self) -> Result<RobotLink, LinkError> {
        RobotLink::connect(&self.config)
    }

    /// 使用已连接的适配器构建（测试、自定义传输）
    pub fn build_with_adapters<C, S>(self, command: C, status: S) -> Result<RobotLink, LinkError>
    where
        C: LinkAdapter + Send + 'static,
        S: LinkAdapter + Send + 'static,
    {
        RobotLink::new(command, status, &self.config)
    }
}
