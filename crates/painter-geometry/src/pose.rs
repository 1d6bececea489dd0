//! 位姿与关节角类型
//!
//! [`CartesianPose`] 是与控制器交换的笛卡尔位姿单位（直线运动、逆解运动、位姿查询），
//! [`JointAngles`] 是六个关节角，仅用于关节空间运动。

use crate::rotation::RpyRotation;
use crate::vector::{Point, Vector3};
use std::fmt;
use std::ops::{Index, IndexMut};

/// 关节数量
pub const JOINT_COUNT: usize = 6;

/// 笛卡尔位姿（位置 + RPY 姿态）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartesianPose {
    /// 工具末端位置（毫米）
    pub position: Point,
    /// 工具姿态（度）
    pub orientation: RpyRotation,
}

impl CartesianPose {
    /// 创建新的位姿
    pub const fn new(position: Point, orientation: RpyRotation) -> Self {
        CartesianPose {
            position,
            orientation,
        }
    }

    /// 从控制器数组格式 `[x, y, z, rx, ry, rz]` 创建
    pub const fn from_array(values: [f64; 6]) -> Self {
        CartesianPose {
            position: Vector3::new(values[0], values[1], values[2]),
            orientation: RpyRotation::new(values[3], values[4], values[5]),
        }
    }

    /// 转换为控制器数组格式 `[x, y, z, rx, ry, rz]`
    pub const fn to_array(&self) -> [f64; 6] {
        [
            self.position.dx,
            self.position.dy,
            self.position.dz,
            self.orientation.roll,
            self.orientation.pitch,
            self.orientation.yaw,
        ]
    }

    /// 工具局部 +Z 轴在世界坐标系中的方向（单位向量）
    pub fn tool_z_axis(&self) -> Vector3 {
        self.orientation.to_matrix() * Vector3::UNIT_Z
    }

    /// 沿工具局部 +Z 轴偏移 `distance` 后的点
    ///
    /// 用于刚性针尖、传感器长度等固定工具偏移。
    pub fn offset_along_tool_z(&self, distance: f64) -> Point {
        self.position + self.tool_z_axis() * distance
    }

    /// 保持姿态，替换位置
    pub fn with_position(&self, position: Point) -> Self {
        CartesianPose {
            position,
            orientation: self.orientation,
        }
    }
}

impl fmt::Display for CartesianPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position, self.orientation)
    }
}

impl From<[f64; 6]> for CartesianPose {
    fn from(values: [f64; 6]) -> Self {
        CartesianPose::from_array(values)
    }
}

/// 六个关节角（度）
///
/// 对几何引擎不透明，只作为关节运动的参数。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointAngles(pub [f64; JOINT_COUNT]);

impl JointAngles {
    /// 创建新的关节角
    pub const fn new(values: [f64; JOINT_COUNT]) -> Self {
        JointAngles(values)
    }

    /// 全零关节角
    pub const ZERO: Self = JointAngles([0.0; JOINT_COUNT]);

    /// 仅转动单个关节的增量（用于相对关节运动）
    pub fn single(joint: usize, angle: f64) -> Self {
        let mut values = [0.0; JOINT_COUNT];
        if let Some(slot) = values.get_mut(joint) {
            *slot = angle;
        }
        JointAngles(values)
    }

    /// 转换为数组
    pub const fn to_array(&self) -> [f64; JOINT_COUNT] {
        self.0
    }

    /// 迭代各关节
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

impl Index<usize> for JointAngles {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for JointAngles {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl From<[f64; JOINT_COUNT]> for JointAngles {
    fn from(values: [f64; JOINT_COUNT]) -> Self {
        JointAngles(values)
    }
}

impl fmt::Display for JointAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", v)?;
        }
        write!(f, "]")
    }
}
