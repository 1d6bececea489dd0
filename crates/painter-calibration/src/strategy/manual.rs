//! 手动标定：操作员把工具中心点移到每个标定点

use super::{CalibrationStrategy, run_interactive};
use crate::config::CalibrationConfig;
use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use crate::operator::OperatorPrompt;
use crate::robot::CalibrationRobot;
use crate::session::{CalibrationSample, CalibrationSession};

/// 手动标定
///
/// 每个点取机械臂的当前位姿；工具姿态取零点采样时的姿态。
pub struct ManualStrategy<R, P> {
    robot: R,
    operator: P,
    session: CalibrationSession,
}

impl<R: CalibrationRobot, P: OperatorPrompt> ManualStrategy<R, P> {
    pub fn new(robot: R, operator: P, config: &CalibrationConfig) -> Self {
        Self {
            robot,
            operator,
            session: CalibrationSession::new(config.units_per_length, config.orientation),
        }
    }

    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }

    pub fn operator(&self) -> &P {
        &self.operator
    }
}

impl<R: CalibrationRobot, P: OperatorPrompt> CalibrationStrategy for ManualStrategy<R, P> {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn calibrate(&mut self) -> Result<CoordinateSystem2D, CalibrationError> {
        let robot = &self.robot;
        run_interactive(&mut self.session, &mut self.operator, |_| {
            let pose = robot.current_pose()?;
            Ok(CalibrationSample::from_pose(&pose, 0.0))
        })
    }
}
