//! 标定错误类型定义

use painter_driver::{ConfigError, LinkError};
use painter_geometry::GeometryError;
use thiserror::Error;

/// 标定层错误类型
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// 画布坐标超出标定范围
    #[error("Canvas point ({x}, {y}) outside calibrated extent [0, {max_x}] x [0, {max_y}]")]
    OutOfBounds { x: f64, y: f64, max_x: f64, max_y: f64 },

    /// 采样点不足就尝试完成标定
    #[error("Calibration incomplete: missing {missing}")]
    IncompleteCalibration { missing: String },

    /// 探测行程内未检测到接触
    #[error("No contact detected within {max_travel} mm of probing")]
    NoContact { max_travel: f64 },

    /// 传感器所在的模拟输入不存在
    #[error("Analog input {index} unavailable (controller reports {available})")]
    SensorUnavailable { index: usize, available: usize },

    /// 上方参考点落在标定平面上，无法判断平面朝向
    #[error("Up reference point lies on the calibration plane (distance {distance})")]
    AmbiguousSurfaceSide { distance: f64 },

    /// 标定记录内部不一致
    #[error("Corrupt calibration record: {reason}")]
    CorruptRecord { reason: String },

    /// 单位比例非法
    #[error("Invalid units per length: {0}")]
    InvalidScale(f64),

    /// 操作员中止
    #[error("Calibration aborted by operator")]
    Aborted,

    /// 几何前置条件不满足（点重合、共线等）
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// 与机械臂通信失败
    #[error("Robot link error: {0}")]
    Link(#[from] LinkError),

    /// 读写标定记录失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 标定记录格式错误
    #[error("Record format error: {0}")]
    Json(#[from] serde_json::Error),

    /// 标定配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CalibrationError {
    /// 是否可恢复
    ///
    /// 可恢复的错误不改变会话状态，操作员可以重新采样后再试。
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. }
                | Self::IncompleteCalibration { .. }
                | Self::NoContact { .. }
                | Self::AmbiguousSurfaceSide { .. }
                | Self::Geometry(_)
        )
    }
}
