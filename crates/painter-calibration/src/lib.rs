//! # Painter Calibration
//!
//! 画布坐标标定：由三个世界坐标点构建 2D 画布坐标系，
//! 并提供多种采集这三个点的策略。
//!
//! - [`CoordinateSystem2D`]：画布坐标 ↔ 世界坐标
//! - [`CalibrationSession`]：采集状态机（零点、X 轴点、Y 轴点 → 完成）
//! - [`strategy`]：手动、针尖、传感器探测、预加载
//! - [`persist`]：JSON 记录读写
//!
//! # 示例
//!
//! ```rust
//! use painter_calibration::CoordinateSystem2D;
//! use painter_geometry::{RpyRotation, Vector3};
//!
//! let canvas = CoordinateSystem2D::build(
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(100.0, 0.0, 0.0),
//!     Vector3::new(0.0, 50.0, 0.0),
//!     RpyRotation::new(180.0, 0.0, 0.0),
//!     1.0,
//!     Vector3::new(0.0, 0.0, 1.0),
//! )?;
//! let p = canvas.canvas_to_world(50.0, 25.0, 10.0)?;
//! assert!(p.approx_eq(&Vector3::new(50.0, 25.0, 10.0), 1e-9));
//! # Ok::<(), painter_calibration::CalibrationError>(())
//! ```

pub mod config;
mod coordinate;
mod error;
pub mod operator;
pub mod persist;
mod robot;
pub mod session;
pub mod strategy;

pub use config::{CalibrationConfig, OrientationSource, ProbeConfig};
pub use coordinate::{BOUNDS_TOLERANCE, CoordinateSystem2D, MIN_UP_REFERENCE_DISTANCE};
pub use error::CalibrationError;
pub use operator::{LineOperator, LocationAction, OperatorAction, OperatorPrompt, ScriptedOperator};
pub use robot::CalibrationRobot;
pub use session::{CalibrationPoint, CalibrationSample, CalibrationSession, CalibrationState};
pub use strategy::{
    CalibrationStrategy, LocationCapture, LocationDictionary, ManualStrategy, NeedleStrategy,
    PreloadedCalibration, ProbeOutcome, SensorProbeStrategy,
};
