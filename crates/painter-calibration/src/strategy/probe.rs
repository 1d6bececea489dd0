//! 传感器探测标定
//!
//! 从每个点的接近位姿出发，沿工具 +Z 轴小步直线移动，每步读取一次模拟输入：
//! 读数在 `[in_range_min, in_range_max]` 内表示尚未接触，越界表示接触。
//! 接触位置沿工具 +Z 再偏移传感器长度即为表面点。
//!
//! 每一步都是一次完整的 `moveL` 往返，总步数受 `max_travel / step` 限制。

use super::CalibrationStrategy;
use crate::config::{CalibrationConfig, ProbeConfig};
use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use crate::robot::CalibrationRobot;
use crate::session::{CalibrationPoint, CalibrationSample, CalibrationSession};
use painter_driver::MovementType;
use painter_geometry::{CartesianPose, RpyRotation};
use tracing::{debug, info, warn};

/// 单点探测结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    /// 检测到接触时的工具位姿
    pub contact: CartesianPose,
    /// 从接近位姿起的行程
    pub travel: f64,
    /// 触发接触的读数
    pub reading: f64,
    /// 执行的步数
    pub steps: usize,
}

/// 传感器探测标定
pub struct SensorProbeStrategy<R> {
    robot: R,
    approaches: [CartesianPose; 3],
    probe: ProbeConfig,
    approach_speed: f64,
    approach_accel: f64,
    session: CalibrationSession,
}

impl<R: CalibrationRobot> SensorProbeStrategy<R> {
    /// 创建探测标定
    ///
    /// # 参数
    ///
    /// - `approaches`: 零点、X 轴点、Y 轴点的接近位姿（工具 +Z 指向表面）
    ///
    /// # 错误
    ///
    /// 探测参数非法时返回 `CalibrationError::Config`。
    pub fn new(
        robot: R,
        approaches: [CartesianPose; 3],
        config: &CalibrationConfig,
    ) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self {
            robot,
            approaches,
            probe: config.probe.clone(),
            approach_speed: config.approach_speed,
            approach_accel: config.approach_accel,
            session: CalibrationSession::new(config.units_per_length, config.orientation),
        })
    }

    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }

    /// 丢弃已探测的点，下次标定重新探测全部三个点
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// 探测单个点
    ///
    /// 无论成功与否，结束时工具都回到接近位姿。
    ///
    /// # 错误
    ///
    /// - `NoContact`: 走完最大行程仍未接触
    /// - `SensorUnavailable`: 控制器没有配置的模拟输入
    /// - `Link`: 通信失败（不回退）
    pub fn probe(&self, approach: &CartesianPose) -> Result<ProbeOutcome, CalibrationError> {
        self.robot.move_linear(
            approach,
            self.approach_speed,
            self.approach_accel,
            MovementType::Absolute,
        )?;

        let increment = CartesianPose::new(
            approach.tool_z_axis() * self.probe.step,
            RpyRotation::default(),
        );
        let max_steps = self.probe.max_steps();
        let mut steps = 0;

        loop {
            let reading = self.read_sensor()?;
            if !self.probe.is_in_range(reading) {
                let contact = self.robot.current_pose()?;
                let travel = steps as f64 * self.probe.step;
                info!(
                    "Contact after {} steps ({:.3} mm), reading {:.4}",
                    steps, travel, reading
                );
                self.retract(approach)?;
                return Ok(ProbeOutcome {
                    contact,
                    travel,
                    reading,
                    steps,
                });
            }

            if steps >= max_steps {
                warn!(
                    "No contact within {} mm from {}",
                    self.probe.max_travel, approach.position
                );
                self.retract(approach)?;
                return Err(CalibrationError::NoContact {
                    max_travel: self.probe.max_travel,
                });
            }

            self.robot.move_linear(
                &increment,
                self.probe.speed,
                self.probe.accel,
                MovementType::Relative,
            )?;
            steps += 1;
        }
    }

    fn read_sensor(&self) -> Result<f64, CalibrationError> {
        let inputs = self.robot.analog_inputs()?;
        inputs
            .get(self.probe.analog_index)
            .copied()
            .ok_or(CalibrationError::SensorUnavailable {
                index: self.probe.analog_index,
                available: inputs.len(),
            })
    }

    fn retract(&self, approach: &CartesianPose) -> Result<(), CalibrationError> {
        debug!("Retracting to {}", approach);
        self.robot.move_linear(
            approach,
            self.approach_speed,
            self.approach_accel,
            MovementType::Absolute,
        )?;
        Ok(())
    }

    fn approach_for(&self, point: CalibrationPoint) -> &CartesianPose {
        match point {
            CalibrationPoint::Zero => &self.approaches[0],
            CalibrationPoint::AxisX => &self.approaches[1],
            CalibrationPoint::AxisY => &self.approaches[2],
        }
    }
}

impl<R: CalibrationRobot> CalibrationStrategy for SensorProbeStrategy<R> {
    fn name(&self) -> &'static str {
        "sensor_probe"
    }

    /// 依次探测尚未采集的点
    ///
    /// 某个点失败时已采集的点保留，再次调用只探测缺失的点。
    /// 三个点构不成坐标系时全部丢弃，再次调用重新探测。
    fn calibrate(&mut self) -> Result<CoordinateSystem2D, CalibrationError> {
        for point in self.session.missing() {
            let approach = *self.approach_for(point);
            info!("Probing {} from {}", point, approach);
            let outcome = self.probe(&approach)?;
            let sample = CalibrationSample::from_pose(&outcome.contact, self.probe.sensor_length);
            self.session.record(point, sample);
        }

        let result = self.session.finish().cloned();
        if let Err(e) = &result {
            warn!("Probed points rejected ({}), discarding samples", e);
            self.session.reset();
        }
        result
    }
}
