//! 三维向量类型
//!
//! `Vector3` 是几何库的基础值类型，同时充当世界坐标系中的点（见 [`Point`]）。
//!
//! # 示例
//!
//! ```rust
//! use painter_geometry::Vector3;
//!
//! let a = Vector3::new(1.0, 0.0, 0.0);
//! let b = Vector3::new(0.0, 1.0, 0.0);
//! assert_eq!(a.cross(&b), Vector3::new(0.0, 0.0, 1.0));
//! assert_eq!(a.dot(&b), 0.0);
//! ```

use crate::error::GeometryError;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// 归一化阈值：长度低于此值的向量视为退化
pub const DEGENERATE_LENGTH_THRESHOLD: f64 = 1e-9;

/// 三维向量（分量单位与调用方一致，通常为毫米）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    /// X 分量
    pub dx: f64,
    /// Y 分量
    pub dy: f64,
    /// Z 分量
    pub dz: f64,
}

/// 世界坐标系中的点
///
/// 点与向量共用同一表示，`a - b` 即从 `b` 指向 `a` 的位移。
pub type Point = Vector3;

impl Vector3 {
    /// 零向量
    pub const ZERO: Self = Vector3::new(0.0, 0.0, 0.0);
    /// 世界 X 轴单位向量
    pub const UNIT_X: Self = Vector3::new(1.0, 0.0, 0.0);
    /// 世界 Y 轴单位向量
    pub const UNIT_Y: Self = Vector3::new(0.0, 1.0, 0.0);
    /// 世界 Z 轴单位向量
    pub const UNIT_Z: Self = Vector3::new(0.0, 0.0, 1.0);

    /// 创建新的三维向量
    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Vector3 { dx, dy, dz }
    }

    /// 从数组创建
    pub const fn from_array(values: [f64; 3]) -> Self {
        Vector3::new(values[0], values[1], values[2])
    }

    /// 转换为数组
    pub const fn to_array(self) -> [f64; 3] {
        [self.dx, self.dy, self.dz]
    }

    /// 向量长度（欧几里得范数）
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// 归一化为单位向量
    ///
    /// # 错误
    ///
    /// 长度小于 [`DEGENERATE_LENGTH_THRESHOLD`] 时返回
    /// [`GeometryError::DegenerateVector`]，不会返回零向量或 NaN。
    pub fn normalize(&self) -> Result<Self, GeometryError> {
        let length = self.length();
        if !(length >= DEGENERATE_LENGTH_THRESHOLD) {
            return Err(GeometryError::DegenerateVector {
                length,
                threshold: DEGENERATE_LENGTH_THRESHOLD,
            });
        }
        Ok(*self / length)
    }

    /// 点积
    pub fn dot(&self, other: &Vector3) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    /// 叉积（右手系）
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            dx: self.dy * other.dz - self.dz * other.dy,
            dy: self.dz * other.dx - self.dx * other.dz,
            dz: self.dx * other.dy - self.dy * other.dx,
        }
    }

    /// 到另一点的距离
    pub fn distance_to(&self, other: &Point) -> f64 {
        (*other - *self).length()
    }

    /// 绕世界 X 轴旋转（弧度）
    pub fn rotate_x(&self, angle: f64) -> Vector3 {
        let (s, c) = angle.sin_cos();
        Vector3 {
            dx: self.dx,
            dy: self.dy * c - self.dz * s,
            dz: self.dy * s + self.dz * c,
        }
    }

    /// 绕世界 Y 轴旋转（弧度）
    pub fn rotate_y(&self, angle: f64) -> Vector3 {
        let (s, c) = angle.sin_cos();
        Vector3 {
            dx: self.dx * c + self.dz * s,
            dy: self.dy,
            dz: -self.dx * s + self.dz * c,
        }
    }

    /// 绕世界 Z 轴旋转（弧度）
    pub fn rotate_z(&self, angle: f64) -> Vector3 {
        let (s, c) = angle.sin_cos();
        Vector3 {
            dx: self.dx * c - self.dy * s,
            dy: self.dx * s + self.dy * c,
            dz: self.dz,
        }
    }

    /// 依次绕 X、Y、Z 轴旋转（弧度）
    ///
    /// 等价于左乘 `Rz(rz)·Ry(ry)·Rx(rx)`，与 [`RotationMatrix::from_rpy`](crate::RotationMatrix::from_rpy)
    /// 的约定一致。
    pub fn rotate_xyz(&self, rx: f64, ry: f64, rz: f64) -> Vector3 {
        self.rotate_x(rx).rotate_y(ry).rotate_z(rz)
    }

    /// 按分量比较是否近似相等
    pub fn approx_eq(&self, other: &Vector3, tolerance: f64) -> bool {
        (self.dx - other.dx).abs() <= tolerance
            && (self.dy - other.dy).abs() <= tolerance
            && (self.dz - other.dz).abs() <= tolerance
    }

    pub(crate) fn to_nalgebra(self) -> nalgebra::Vector3<f64> {
        nalgebra::Vector3::new(self.dx, self.dy, self.dz)
    }

    pub(crate) fn from_nalgebra(v: &nalgebra::Vector3<f64>) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.dx, self.dy, self.dz)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.dx + rhs.dx, self.dy + rhs.dy, self.dz + rhs.dz)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        self + (-rhs)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Vector3) {
        *self = *self - rhs;
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.dx, -self.dy, -self.dz)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.dx * rhs, self.dy * rhs, self.dz * rhs)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs * self
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f64) -> Vector3 {
        self * (1.0 / rhs)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(values: [f64; 3]) -> Self {
        Vector3::from_array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_arithmetic() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!(b / 2.0, Vector3::new(2.0, 2.5, 3.0));

        let mut c = a;
        c += b;
        c -= a;
        assert_eq!(c, b);
    }

    #[test]
    fn test_cross_and_dot() {
        assert_eq!(Vector3::UNIT_X.cross(&Vector3::UNIT_Y), Vector3::UNIT_Z);
        assert_eq!(Vector3::UNIT_Y.cross(&Vector3::UNIT_X), -Vector3::UNIT_Z);
        assert_eq!(Vector3::new(1.0, 2.0, 3.0).dot(&Vector3::new(4.0, -5.0, 6.0)), 12.0);
    }

    #[test]
    fn test_normalize() {
        let v = Vector3::new(3.0, 0.0, 4.0).normalize().unwrap();
        assert_relative_eq!(v.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.dx, 0.6, epsilon = 1e-12);
        assert_relative_eq!(v.dz, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_degenerate() {
        // 测试长度小于阈值的向量
        let result = Vector3::new(1e-10, 0.0, 0.0).normalize();
        assert!(matches!(result, Err(GeometryError::DegenerateVector { .. })));

        let result = Vector3::ZERO.normalize();
        assert!(result.is_err());

        // NaN 分量同样视为退化
        let result = Vector3::new(f64::NAN, 0.0, 0.0).normalize();
        assert!(result.is_err());
    }

    #[test]
    fn test_principal_rotations() {
        let x = Vector3::UNIT_X;
        assert!(x.rotate_z(FRAC_PI_2).approx_eq(&Vector3::UNIT_Y, 1e-12));
        assert!(x.rotate_y(FRAC_PI_2).approx_eq(&-Vector3::UNIT_Z, 1e-12));
        assert!(Vector3::UNIT_Y.rotate_x(FRAC_PI_2).approx_eq(&Vector3::UNIT_Z, 1e-12));
    }

    #[test]
    fn test_rotate_xyz_order() {
        // 先绕 X 再绕 Z：Z 轴绕 X 转 90° 到 -Y，再绕 Z 转 90° 到 +X
        let v = Vector3::UNIT_Z.rotate_xyz(FRAC_PI_2, 0.0, FRAC_PI_2);
        assert!(v.approx_eq(&Vector3::UNIT_X, 1e-12), "got {}", v);
    }

    #[test]
    fn test_display() {
        let v = Vector3::new(1.0, 2.5, -3.25);
        assert_eq!(format!("{}", v), "(1.000, 2.500, -3.250)");
    }
}
