//! Painter SDK - JAKA 喷涂机械臂 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **几何层** (`geometry`): 向量、旋转矩阵、RPY 角、位姿
//! - **协议层** (`protocol`): JSON 文本帧编码/解码
//! - **传输层** (`transport`): 字节流适配器（TCP、Mock）
//! - **驱动层** (`driver`): 指令/状态双通道连接与类型化操作
//! - **标定层** (`calibration`): 画布坐标系与标定策略
//!
//! # 快速开始
//!
//! ```no_run
//! use painter_sdk::prelude::*;
//!
//! painter_sdk::init_logging();
//! let link = RobotLinkBuilder::new().host("192.168.1.100").connect()?;
//! link.power_on()?;
//! link.enable_robot()?;
//! let pose = link.get_pose()?;
//! println!("tool at {}", pose);
//! # Ok::<(), LinkError>(())
//! ```

pub use painter_calibration as calibration;
pub use painter_driver as driver;
pub use painter_geometry as geometry;
pub use painter_protocol as protocol;
pub use painter_transport as transport;

mod logging;
pub mod prelude;

pub use logging::{DEFAULT_LOG_FILTER, init_logging, init_logging_with_filter};

// --- 常用类型 ---
pub use painter_calibration::{CalibrationError, CalibrationStrategy, CoordinateSystem2D};
pub use painter_driver::{LinkConfig, LinkError, RobotLink, RobotLinkBuilder};
pub use painter_geometry::{CartesianPose, GeometryError, JointAngles, RpyRotation, Vector3};
pub use painter_protocol::ProtocolError;
pub use painter_transport::TransportError;
