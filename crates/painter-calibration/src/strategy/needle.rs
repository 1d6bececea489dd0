//! 针尖标定：工具上装有固定长度的针，针尖接触标定点

use super::{CalibrationStrategy, run_interactive};
use crate::config::CalibrationConfig;
use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use crate::operator::OperatorPrompt;
use crate::robot::CalibrationRobot;
use crate::session::{CalibrationSample, CalibrationSession};
use tracing::debug;

/// 针尖标定
///
/// 采样点 = 当前工具中心点沿工具 +Z 轴偏移针长；
/// 平面朝向由工具中心点（针的另一端）决定。
pub struct NeedleStrategy<R, P> {
    robot: R,
    operator: P,
    needle_length: f64,
    session: CalibrationSession,
}

impl<R: CalibrationRobot, P: OperatorPrompt> NeedleStrategy<R, P> {
    pub fn new(robot: R, operator: P, config: &CalibrationConfig) -> Self {
        Self {
            robot,
            operator,
            needle_length: config.needle_length,
            session: CalibrationSession::new(config.units_per_length, config.orientation),
        }
    }

    pub fn needle_length(&self) -> f64 {
        self.needle_length
    }

    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }
}

impl<R: CalibrationRobot, P: OperatorPrompt> CalibrationStrategy for NeedleStrategy<R, P> {
    fn name(&self) -> &'static str {
        "needle"
    }

    fn calibrate(&mut self) -> Result<CoordinateSystem2D, CalibrationError> {
        let robot = &self.robot;
        let needle_length = self.needle_length;
        run_interactive(&mut self.session, &mut self.operator, |point| {
            let pose = robot.current_pose()?;
            let sample = CalibrationSample::from_pose(&pose, needle_length);
            debug!("Needle tip for {}: {} (tool at {})", point, sample.point, pose.position);
            Ok(sample)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{OperatorAction, ScriptedOperator};
    use crate::robot::sim::SimRobot;
    use crate::session::CalibrationPoint;
    use painter_geometry::{CartesianPose, RpyRotation, Vector3};

    #[test]
    fn test_needle_offset_applied_to_every_point() {
        // 工具朝下、针长 25，工具中心点在 z = 125，针尖在 z = 100
        let tool = CartesianPose::new(
            Vector3::new(0.0, 0.0, 125.0),
            RpyRotation::new(180.0, 0.0, 0.0),
        );
        let robot = SimRobot::new(tool, |_| 0.0);
        let config = CalibrationConfig {
            needle_length: 25.0,
            ..CalibrationConfig::default()
        };

        let mut strategy = NeedleStrategy::new(
            &robot,
            ScriptedOperator::new([OperatorAction::Sample(CalibrationPoint::Zero)]),
            &config,
        );
        // 只采了零点，脚本用完后放弃
        assert!(matches!(strategy.calibrate(), Err(CalibrationError::Aborted)));
        let zero = strategy.session().sample(CalibrationPoint::Zero).unwrap();
        assert!(zero.point.approx_eq(&Vector3::new(0.0, 0.0, 100.0), 1e-9));
        assert_eq!(zero.up_reference, Vector3::new(0.0, 0.0, 125.0));
    }

    #[test]
    fn test_needle_calibration_on_tilted_tool() {
        // 工具绕 Y 轴倾斜 90°：工具 +Z 指向世界 +X，针尖在工具中心点 +X 方向
        let tool = CartesianPose::new(Vector3::ZERO, RpyRotation::new(0.0, 90.0, 0.0));
        let robot = SimRobot::new(tool, |_| 0.0);
        let config = CalibrationConfig {
            needle_length: 10.0,
            ..CalibrationConfig::default()
        };

        // 操作员不移动机械臂，三个点相同：构建失败但可恢复，最后放弃
        let operator = ScriptedOperator::new([
            OperatorAction::Sample(CalibrationPoint::Zero),
            OperatorAction::Sample(CalibrationPoint::AxisX),
            OperatorAction::Sample(CalibrationPoint::AxisY),
            OperatorAction::Finish,
        ]);
        let mut strategy = NeedleStrategy::new(&robot, operator, &config);
        assert!(matches!(strategy.calibrate(), Err(CalibrationError::Aborted)));
        assert!(strategy.session().is_ready());
        let tip = strategy.session().sample(CalibrationPoint::AxisX).unwrap().point;
        assert!(tip.approx_eq(&Vector3::new(10.0, 0.0, 0.0), 1e-9));
    }
}
