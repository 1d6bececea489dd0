//! 使用之前保存的标定结果

use super::CalibrationStrategy;
use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use crate::persist;
use std::path::Path;
use tracing::info;

/// 预加载的标定
///
/// 不与机械臂交互，直接返回已保存的坐标系。
#[derive(Debug, Clone)]
pub struct PreloadedCalibration {
    system: CoordinateSystem2D,
}

impl PreloadedCalibration {
    pub fn new(system: CoordinateSystem2D) -> Self {
        Self { system }
    }

    /// 从 JSON 记录加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CalibrationError> {
        let system = persist::load_coordinate_system(path.as_ref())?;
        info!("Loaded calibration from {}", path.as_ref().display());
        Ok(Self::new(system))
    }
}

impl CalibrationStrategy for PreloadedCalibration {
    fn name(&self) -> &'static str {
        "preloaded"
    }

    fn calibrate(&mut self) -> Result<CoordinateSystem2D, CalibrationError> {
        Ok(self.system.clone())
    }
}
