//! 驱动层模块
//!
//! 本模块提供 JAKA 喷涂机械臂的连接与控制功能，包括：
//! - 指令通道（同步、单发单收，互斥锁串行化）
//! - 状态通道（后台线程读取，ArcSwap 无锁快照 + 有界遥测队列）
//! - 类型化操作（上电、使能、关节/直线/末端运动、IO、位姿查询）
//! - 回复订阅（调试日志、转发到通道）
//!
//! # 使用场景
//!
//! 标定和上层应用通过 [`RobotLink`] 与控制器交互；
//! 单元测试可以用 `painter_transport::MockAdapter` 替代 TCP 连接。

mod builder;
pub mod config;
mod error;
pub mod hooks;
mod link;
mod ops;
pub mod status;

pub use builder::RobotLinkBuilder;
pub use config::{ConfigError, LinkConfig};
pub use error::{Channel, LinkError};
pub use hooks::{ChannelForwarder, HookManager, ReplyCallback, SubscriptionId, TracingReplyLogger};
pub use link::RobotLink;
pub use ops::{GRIP_OUTPUT, MovementType, RobotData};
pub use status::{ConnectionMonitor, StatusSnapshot};

pub use painter_protocol::{Command, RawReply};
