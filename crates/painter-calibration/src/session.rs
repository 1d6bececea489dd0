//! 标定会话状态机
//!
//! ```text
//! AwaitingZero → AwaitingAxisX → AwaitingAxisY ──finish──→ Complete
//! ```
//!
//! 三个点可以按任意顺序采集、重复采集（保留最新一次）。
//! 完成掩码（零点 = 1，X = 2，Y = 4）等于 7 之前 `finish` 失败且状态不变；
//! 完成后坐标系只构建一次。

use crate::config::OrientationSource;
use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use painter_geometry::{CartesianPose, Point, RpyRotation, plane_orientation};
use std::fmt;
use tracing::{debug, info};

/// 工具中心点与采样点重合时，上方参考点沿工具 -Z 的后退距离
pub const UP_REFERENCE_BACKOFF: f64 = 1.0;

/// 完成掩码全满
pub const COMPLETE_MASK: u8 = 0b111;

/// 标定点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationPoint {
    /// 画布原点
    Zero,
    /// 画布 +X 轴上的点
    AxisX,
    /// 画布 +Y 轴上的点
    AxisY,
}

impl CalibrationPoint {
    /// 全部标定点（采集顺序）
    pub const ALL: [CalibrationPoint; 3] = [
        CalibrationPoint::Zero,
        CalibrationPoint::AxisX,
        CalibrationPoint::AxisY,
    ];

    /// 完成掩码中的位
    pub const fn mask_bit(self) -> u8 {
        match self {
            CalibrationPoint::Zero => 0b001,
            CalibrationPoint::AxisX => 0b010,
            CalibrationPoint::AxisY => 0b100,
        }
    }

    const fn slot(self) -> usize {
        match self {
            CalibrationPoint::Zero => 0,
            CalibrationPoint::AxisX => 1,
            CalibrationPoint::AxisY => 2,
        }
    }
}

impl fmt::Display for CalibrationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationPoint::Zero => write!(f, "zero"),
            CalibrationPoint::AxisX => write!(f, "axis X"),
            CalibrationPoint::AxisY => write!(f, "axis Y"),
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    AwaitingZero,
    AwaitingAxisX,
    /// 等待 Y 轴点；三个点都采集后也停留在这里，直到 `finish`
    AwaitingAxisY,
    Complete,
}

impl CalibrationState {
    fn awaiting(point: CalibrationPoint) -> Self {
        match point {
            CalibrationPoint::Zero => CalibrationState::AwaitingZero,
            CalibrationPoint::AxisX => CalibrationState::AwaitingAxisX,
            CalibrationPoint::AxisY => CalibrationState::AwaitingAxisY,
        }
    }
}

/// 一次采样结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    /// 画布上的点（世界坐标）
    pub point: Point,
    /// 采样时的工具姿态
    pub orientation: RpyRotation,
    /// 平面上方的参考点
    pub up_reference: Point,
}

impl CalibrationSample {
    /// 由工具位姿和沿工具 +Z 的针尖偏移得到采样
    ///
    /// 针尖偏移为 0 时工具中心点就是采样点，参考点取工具 -Z 方向后退
    /// [`UP_REFERENCE_BACKOFF`] 的位置；否则参考点就是工具中心点。
    pub fn from_pose(pose: &CartesianPose, tip_offset: f64) -> Self {
        let point = pose.offset_along_tool_z(tip_offset);
        let up_reference = if tip_offset > 0.0 {
            pose.position
        } else {
            pose.offset_along_tool_z(tip_offset - UP_REFERENCE_BACKOFF)
        };
        Self {
            point,
            orientation: pose.orientation,
            up_reference,
        }
    }
}

/// 标定会话
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    samples: [Option<CalibrationSample>; 3],
    units_per_length: f64,
    orientation_source: OrientationSource,
    result: Option<CoordinateSystem2D>,
}

impl CalibrationSession {
    pub fn new(units_per_length: f64, orientation_source: OrientationSource) -> Self {
        Self {
            samples: [None; 3],
            units_per_length,
            orientation_source,
            result: None,
        }
    }

    /// 当前状态
    pub fn state(&self) -> CalibrationState {
        if self.result.is_some() {
            return CalibrationState::Complete;
        }
        CalibrationPoint::ALL
            .into_iter()
            .find(|p| self.samples[p.slot()].is_none())
            .map(CalibrationState::awaiting)
            .unwrap_or(CalibrationState::AwaitingAxisY)
    }

    /// 完成掩码（零点 = 1，X = 2，Y = 4）
    pub fn completion_mask(&self) -> u8 {
        CalibrationPoint::ALL
            .into_iter()
            .filter(|p| self.samples[p.slot()].is_some())
            .fold(0, |mask, p| mask | p.mask_bit())
    }

    /// 三个点是否都已采集
    pub fn is_ready(&self) -> bool {
        self.completion_mask() == COMPLETE_MASK
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// 尚未采集的点
    pub fn missing(&self) -> Vec<CalibrationPoint> {
        CalibrationPoint::ALL
            .into_iter()
            .filter(|p| self.samples[p.slot()].is_none())
            .collect()
    }

    pub fn sample(&self, point: CalibrationPoint) -> Option<&CalibrationSample> {
        self.samples[point.slot()].as_ref()
    }

    /// 记录采样（覆盖同一点之前的采样）
    ///
    /// 已完成的会话再次记录采样会丢弃之前的结果，重新回到采集阶段。
    pub fn record(&mut self, point: CalibrationPoint, sample: CalibrationSample) -> CalibrationState {
        debug!("Sampled {} at {}", point, sample.point);
        self.samples[point.slot()] = Some(sample);
        self.result = None;
        self.state()
    }

    /// 完成标定
    ///
    /// # 错误
    ///
    /// - `IncompleteCalibration`: 还有点未采集，状态不变
    /// - `Geometry` / `AmbiguousSurfaceSide`: 采样点退化，状态不变，可重新采样
    pub fn finish(&mut self) -> Result<&CoordinateSystem2D, CalibrationError> {
        let system = match self.result.take() {
            Some(system) => system,
            None => {
                let system = self.build()?;
                info!("Calibration complete");
                system
            },
        };
        Ok(self.result.insert(system))
    }

    /// 完成后的坐标系
    pub fn result(&self) -> Option<&CoordinateSystem2D> {
        self.result.as_ref()
    }

    /// 清空所有采样
    pub fn reset(&mut self) {
        self.samples = [None; 3];
        self.result = None;
    }

    fn build(&self) -> Result<CoordinateSystem2D, CalibrationError> {
        let [Some(zero), Some(axis_x), Some(axis_y)] = self.samples else {
            let missing = self
                .missing()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CalibrationError::IncompleteCalibration { missing });
        };

        let orientation = match self.orientation_source {
            OrientationSource::ZeroSample => zero.orientation,
            OrientationSource::PlaneNormal => {
                plane_orientation(zero.point, axis_x.point, axis_y.point, zero.up_reference)?.main
            },
        };

        CoordinateSystem2D::build(
            zero.point,
            axis_x.point,
            axis_y.point,
            orientation,
            self.units_per_length,
            zero.up_reference,
        )
    }
}
