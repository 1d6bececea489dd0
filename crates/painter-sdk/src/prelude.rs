//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use painter_sdk::prelude::*;
//! ```

// 连接与操作
pub use crate::driver::{LinkConfig, MovementType, RobotData, RobotLink, RobotLinkBuilder};

// 几何类型
pub use crate::geometry::{
    AngleUnit, CartesianPose, JointAngles, Point, RotationMatrix, RpyRotation, RpySolutions,
    Vector3,
};

// 标定
pub use crate::calibration::{
    CalibrationConfig, CalibrationSession, CalibrationStrategy, CoordinateSystem2D,
    LineOperator, LocationCapture, LocationDictionary, ManualStrategy, NeedleStrategy,
    OperatorPrompt, PreloadedCalibration, SensorProbeStrategy,
};

// 传输层（常用 Trait）
pub use crate::transport::LinkAdapter;

// 错误类型
pub use crate::calibration::CalibrationError;
pub use crate::driver::LinkError;
pub use crate::geometry::GeometryError;
pub use crate::protocol::ProtocolError;
pub use crate::transport::TransportError;
