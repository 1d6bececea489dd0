//! 标定所需的机械臂能力
//!
//! 标定策略只依赖这三个操作，测试时可以用模拟实现替代真实连接。

use painter_driver::{LinkError, MovementType, RobotLink};
use painter_geometry::CartesianPose;

/// 标定用机械臂接口
pub trait CalibrationRobot {
    /// 当前末端位姿
    fn current_pose(&self) -> Result<CartesianPose, LinkError>;

    /// 直线运动（完成后返回）
    fn move_linear(
        &self,
        pose: &CartesianPose,
        speed: f64,
        accel: f64,
        movement: MovementType,
    ) -> Result<(), LinkError>;

    /// 全部模拟输入
    fn analog_inputs(&self) -> Result<Vec<f64>, LinkError>;
}

impl CalibrationRobot for RobotLink {
    fn current_pose(&self) -> Result<CartesianPose, LinkError> {
        self.get_pose()
    }

    fn move_linear(
        &self,
        pose: &CartesianPose,
        speed: f64,
        accel: f64,
        movement: MovementType,
    ) -> Result<(), LinkError> {
        RobotLink::move_linear(self, pose, speed, accel, movement)
    }

    fn analog_inputs(&self) -> Result<Vec<f64>, LinkError> {
        self.get_analog_inputs()
    }
}

impl<T: CalibrationRobot + ?Sized> CalibrationRobot for &T {
    fn current_pose(&self) -> Result<CartesianPose, LinkError> {
        (**self).current_pose()
    }

    fn move_linear(
        &self,
        pose: &CartesianPose,
        speed: f64,
        accel: f64,
        movement: MovementType,
    ) -> Result<(), LinkError> {
        (**self).move_linear(pose, speed, accel, movement)
    }

    fn analog_inputs(&self) -> Result<Vec<f64>, LinkError> {
        (**self).analog_inputs()
    }
}
