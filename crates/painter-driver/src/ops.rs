//! 类型化操作
//!
//! 把领域类型（[`JointAngles`]、[`CartesianPose`]）转换成线格式指令，
//! 并从回复中取出对应字段。所有操作都建立在 [`RobotLink::execute`] 之上。

use crate::error::LinkError;
use crate::link::RobotLink;
use painter_geometry::{CartesianPose, JointAngles};
use painter_protocol::{Command, RawReply, cmd, field};
use std::sync::atomic::Ordering;
use tracing::{debug, info};

/// 抓手所在的数字输出通道（bank, index）
pub const GRIP_OUTPUT: (u8, u8) = (0, 0);

/// 运动类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementType {
    /// 绝对目标
    #[default]
    Absolute,
    /// 相对当前位置的增量
    Relative,
}

impl MovementType {
    /// 线格式的 `relFlag` 取值
    pub const fn rel_flag(self) -> u8 {
        match self {
            MovementType::Absolute => 0,
            MovementType::Relative => 1,
        }
    }
}

/// `get_data` 的解码结果
#[derive(Debug, Clone, PartialEq)]
pub struct RobotData {
    /// 实际关节角（度）
    pub joints: JointAngles,
    /// 末端实际位姿
    pub pose: CartesianPose,
    /// 数字输入
    pub digital_inputs: Vec<bool>,
    /// 模拟输入
    pub analog_inputs: Vec<f64>,
}

impl RobotData {
    /// 从 `get_data` 回复解码
    ///
    /// # 错误
    ///
    /// 任一字段缺失或类型不符时返回 `ProtocolError`，错误中带字段名。
    pub fn from_reply(reply: &RawReply) -> Result<Self, painter_protocol::ProtocolError> {
        Ok(Self {
            joints: JointAngles::new(reply.get_f64_array_n::<6>(field::JOINT_ACTUAL_POSITION)?),
            pose: CartesianPose::from_array(reply.get_f64_array_n::<6>(field::ACTUAL_POSITION)?),
            digital_inputs: reply.get_bool_array(field::DIN)?,
            analog_inputs: reply.get_f64_array(field::AIN)?,
        })
    }
}

impl RobotLink {
    /// 上电
    pub fn power_on(&self) -> Result<(), LinkError> {
        info!("Powering on robot");
        self.execute_named(cmd::POWER_ON).map(|_| ())
    }

    /// 下电
    pub fn power_off(&self) -> Result<(), LinkError> {
        info!("Powering off robot");
        self.execute_named(cmd::POWER_OFF).map(|_| ())
    }

    /// 使能
    pub fn enable_robot(&self) -> Result<(), LinkError> {
        info!("Enabling robot");
        self.execute_named(cmd::ENABLE_ROBOT).map(|_| ())
    }

    /// 去使能
    pub fn disable_robot(&self) -> Result<(), LinkError> {
        info!("Disabling robot");
        self.execute_named(cmd::DISABLE_ROBOT).map(|_| ())
    }

    /// 关节运动
    ///
    /// # 参数
    ///
    /// - `angles`: 六个关节角（度），相对运动时为增量
    /// - `speed`: 关节速度（度/秒）
    /// - `accel`: 关节加速度（度/秒²）
    /// - `movement`: 绝对或相对
    pub fn joint_move(
        &self,
        angles: &JointAngles,
        speed: f64,
        accel: f64,
        movement: MovementType,
    ) -> Result<(), LinkError> {
        debug!("Joint move to {} ({:?})", angles, movement);
        let command = Command::new(cmd::JOINT_MOVE)
            .param(field::JOINT_POSITION, angles.to_array())
            .param(field::SPEED, speed)
            .param(field::ACCEL, accel)
            .param(field::REL_FLAG, movement.rel_flag());
        self.execute(&command).map(|_| ())
    }

    /// 直线运动
    ///
    /// 位姿按 `[x, y, z, rx, ry, rz]` 编码（毫米、度）。
    pub fn move_linear(
        &self,
        pose: &CartesianPose,
        speed: f64,
        accel: f64,
        movement: MovementType,
    ) -> Result<(), LinkError> {
        debug!("Linear move to {} ({:?})", pose, movement);
        let command = Command::new(cmd::MOVE_LINEAR)
            .param(field::JOINT_POSITION, pose.to_array())
            .param(field::SPEED, speed)
            .param(field::ACCEL, accel)
            .param(field::REL_FLAG, movement.rel_flag());
        self.execute(&command).map(|_| ())
    }

    /// 末端运动（由控制器求逆解，总是绝对目标）
    pub fn move_inverse(
        &self,
        pose: &CartesianPose,
        speed: f64,
        accel: f64,
    ) -> Result<(), LinkError> {
        debug!("Inverse move to {}", pose);
        let command = Command::new(cmd::END_MOVE)
            .param(field::JOINT_POSITION, pose.to_array())
            .param(field::SPEED, speed)
            .param(field::ACCEL, accel);
        self.execute(&command).map(|_| ())
    }

    /// 设置数字输出
    pub fn set_digital_output(&self, bank: u8, index: u8, value: bool) -> Result<(), LinkError> {
        debug!("Digital output [{}:{}] = {}", bank, index, value);
        let command = Command::new(cmd::SET_DIGITAL_OUTPUT)
            .param(field::IO_TYPE, bank)
            .param(field::IO_INDEX, index)
            .param(field::IO_VALUE, value);
        self.execute(&command).map(|_| ())
    }

    /// 查询关节角、位姿和 IO
    pub fn get_robot_data(&self) -> Result<RobotData, LinkError> {
        let reply = self.execute_named(cmd::GET_DATA)?;
        Ok(RobotData::from_reply(&reply)?)
    }

    /// 当前末端位姿
    pub fn get_pose(&self) -> Result<CartesianPose, LinkError> {
        let reply = self.execute_named(cmd::GET_DATA)?;
        let values = reply.get_f64_array_n::<6>(field::ACTUAL_POSITION)?;
        Ok(CartesianPose::from_array(values))
    }

    /// 当前关节角
    pub fn get_joint_angles(&self) -> Result<JointAngles, LinkError> {
        let reply = self.execute_named(cmd::GET_DATA)?;
        let values = reply.get_f64_array_n::<6>(field::JOINT_ACTUAL_POSITION)?;
        Ok(JointAngles::new(values))
    }

    /// 数字输入位数组
    pub fn get_digital_inputs(&self) -> Result<Vec<bool>, LinkError> {
        let reply = self.execute_named(cmd::GET_DATA)?;
        Ok(reply.get_bool_array(field::DIN)?)
    }

    /// 模拟输入
    pub fn get_analog_inputs(&self) -> Result<Vec<f64>, LinkError> {
        let reply = self.execute_named(cmd::GET_DATA)?;
        Ok(reply.get_f64_array(field::AIN)?)
    }

    /// 闭合抓手
    pub fn grip_on(&self) -> Result<(), LinkError> {
        self.set_grip(true)
    }

    /// 松开抓手
    pub fn grip_off(&self) -> Result<(), LinkError> {
        self.set_grip(false)
    }

    /// 切换抓手状态，返回切换后的状态
    pub fn toggle_grip(&self) -> Result<bool, LinkError> {
        let next = !self.is_gripping();
        self.set_grip(next)?;
        Ok(next)
    }

    /// 最近一次成功下发的抓手状态
    pub fn is_gripping(&self) -> bool {
        self.grip_engaged.load(Ordering::Acquire)
    }

    fn set_grip(&self, engaged: bool) -> Result<(), LinkError> {
        let (bank, index) = GRIP_OUTPUT;
        self.set_digital_output(bank, index, engaged)?;
        self.grip_engaged.store(engaged, Ordering::Release);
        Ok(())
    }
}
