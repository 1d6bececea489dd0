//! 标定策略
//!
//! 所有策略的流程相同：采集三个点 → 检查完整性 → 构建 [`CoordinateSystem2D`]。
//! 区别只在于点从哪里来：
//!
//! | 策略 | 采样点 |
//! |---|---|
//! | [`ManualStrategy`] | 操作员把工具中心点移到目标位置 |
//! | [`NeedleStrategy`] | 工具中心点沿工具 +Z 偏移针长 |
//! | [`SensorProbeStrategy`] | 从接近位姿沿工具 +Z 步进，直到传感器读数越界 |
//! | [`PreloadedCalibration`] | 读取之前保存的标定结果 |

mod location;
mod manual;
mod needle;
mod preloaded;
mod probe;

pub use location::{LocationCapture, LocationDictionary};
pub use manual::ManualStrategy;
pub use needle::NeedleStrategy;
pub use preloaded::PreloadedCalibration;
pub use probe::{ProbeOutcome, SensorProbeStrategy};

use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use crate::operator::{OperatorAction, OperatorPrompt};
use crate::session::{CalibrationPoint, CalibrationSample, CalibrationSession};
use tracing::warn;

/// 标定策略
pub trait CalibrationStrategy {
    /// 策略名称（日志用）
    fn name(&self) -> &'static str;

    /// 执行标定
    fn calibrate(&mut self) -> Result<CoordinateSystem2D, CalibrationError>;
}

impl<S: CalibrationStrategy + ?Sized> CalibrationStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn calibrate(&mut self) -> Result<CoordinateSystem2D, CalibrationError> {
        (**self).calibrate()
    }
}

/// 操作员驱动的采集循环
///
/// 可恢复的错误（采样失败、点不足、点退化）通知操作员后重新询问；
/// 其余错误直接返回。
pub(crate) fn run_interactive<P, F>(
    session: &mut CalibrationSession,
    operator: &mut P,
    mut sample: F,
) -> Result<CoordinateSystem2D, CalibrationError>
where
    P: OperatorPrompt,
    F: FnMut(CalibrationPoint) -> Result<CalibrationSample, CalibrationError>,
{
    loop {
        match operator.next_action(session.state(), session.completion_mask())? {
            OperatorAction::Sample(point) => match sample(point) {
                Ok(s) => {
                    session.record(point, s);
                    operator.notify(&format!("Sampled {} at {}", point, s.point));
                },
                Err(e) if e.is_recoverable() => {
                    warn!("Sampling {} failed: {}", point, e);
                    operator.notify(&format!("Sampling {} failed: {}", point, e));
                },
                Err(e) => return Err(e),
            },
            OperatorAction::Finish => match session.finish() {
                Ok(system) => return Ok(system.clone()),
                Err(e) if e.is_recoverable() => {
                    warn!("Cannot finish calibration: {}", e);
                    operator.notify(&e.to_string());
                },
                Err(e) => return Err(e),
            },
            OperatorAction::Abort => return Err(CalibrationError::Aborted),
        }
    }
}
