//! Roll-Pitch-Yaw 旋转
//!
//! 约定：`R = Rz(yaw) · Ry(pitch) · Rx(roll)`，即先绕 X 轴转 roll，
//! 再绕 Y 轴转 pitch，最后绕 Z 轴转 yaw（均为固定世界轴）。
//! 控制器使用相同约定，位姿会在两者之间往返，因此这里的公式不能改动。
//!
//! 几乎每个旋转矩阵都对应两组合法的 RPY 角（主解与备选解），
//! [`RotationMatrix::to_rpy`] 同时返回两者，由调用方按约定选择（默认主解）。
//!
//! # 万向节锁
//!
//! 当 `pitch ≈ ±90°` 时 roll 与 yaw 不再独立。此时固定 `yaw = 0`，
//! 由 `m[1,1]`、`m[1,2]` 求 roll，主解与备选解相同，不会产生 NaN。

use crate::error::GeometryError;
use crate::matrix::RotationMatrix;
use crate::vector::{Point, Vector3};
use std::fmt;

/// 万向节锁判定阈值（`cos(pitch)` 低于此值）
pub const GIMBAL_LOCK_EPSILON: f64 = 1e-9;

/// 角度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    /// 角度制
    #[default]
    Degrees,
    /// 弧度制
    Radians,
}

impl AngleUnit {
    fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Degrees => value.to_radians(),
            AngleUnit::Radians => value,
        }
    }
}

/// Roll-Pitch-Yaw 旋转（角度制）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RpyRotation {
    /// 绕 X 轴（度）
    pub roll: f64,
    /// 绕 Y 轴（度）
    pub pitch: f64,
    /// 绕 Z 轴（度）
    pub yaw: f64,
}

impl RpyRotation {
    /// 创建新的 RPY 旋转（度）
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        RpyRotation { roll, pitch, yaw }
    }

    /// 对应的旋转矩阵
    pub fn to_matrix(&self) -> RotationMatrix {
        RotationMatrix::from_rpy(self.roll, self.pitch, self.yaw, AngleUnit::Degrees)
    }

    /// 弧度制三元组 `(roll, pitch, yaw)`
    pub fn to_radians(&self) -> (f64, f64, f64) {
        (
            self.roll.to_radians(),
            self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
    }

    /// 按分量比较（度）
    pub fn approx_eq(&self, other: &RpyRotation, tolerance: f64) -> bool {
        (self.roll - other.roll).abs() <= tolerance
            && (self.pitch - other.pitch).abs() <= tolerance
            && (self.yaw - other.yaw).abs() <= tolerance
    }
}

impl fmt::Display for RpyRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RPY({:.3}°, {:.3}°, {:.3}°)",
            self.roll, self.pitch, self.yaw
        )
    }
}

/// 旋转矩阵分解出的两组 RPY 解
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpySolutions {
    /// 主解（pitch ∈ [-90°, 90°]）
    pub main: RpyRotation,
    /// 备选解（pitch = 180° − 主解 pitch，归一化到 (-180°, 180°]）
    pub alt: RpyRotation,
}

impl RotationMatrix {
    /// 由 RPY 角构造旋转矩阵：`Rz(yaw) · Ry(pitch) · Rx(roll)`
    pub fn from_rpy(roll: f64, pitch: f64, yaw: f64, unit: AngleUnit) -> Self {
        let (sr, cr) = unit.to_radians(roll).sin_cos();
        let (sp, cp) = unit.to_radians(pitch).sin_cos();
        let (sy, cy) = unit.to_radians(yaw).sin_cos();

        RotationMatrix::from_rows([
            [cy * cp, cy * sp * sr - sy * cr, cy * sp * cr + sy * sr],
            [sy * cp, sy * sp * sr + cy * cr, sy * sp * cr - cy * sr],
            [-sp, cp * sr, cp * cr],
        ])
    }

    /// 分解为两组 RPY 角（度）
    ///
    /// - `pitch1 = asin(-m[2,0])`，`pitch2 = 180° − pitch1`
    /// - `roll1 = atan2(m[2,1], m[2,2])`，`roll2 = atan2(-m[2,1], -m[2,2])`
    /// - `yaw1 = atan2(m[1,0], m[0,0])`，`yaw2 = atan2(-m[1,0], -m[0,0])`
    ///
    /// 万向节锁时两组解相同，见模块文档。
    pub fn to_rpy(&self) -> RpySolutions {
        let m = self;
        let sin_pitch = (-m[(2, 0)]).clamp(-1.0, 1.0);
        let cos_pitch = m[(2, 1)].hypot(m[(2, 2)]);

        if cos_pitch < GIMBAL_LOCK_EPSILON {
            let pitch = 90f64.copysign(sin_pitch);
            let roll = (-m[(1, 2)]).atan2(m[(1, 1)]).to_degrees();
            tracing::warn!(
                "Gimbal lock while decomposing rotation (m[2,0]={:.6}): yaw fixed to 0, roll={:.3}",
                m[(2, 0)],
                roll
            );
            let solution = RpyRotation::new(roll, pitch, 0.0);
            return RpySolutions {
                main: solution,
                alt: solution,
            };
        }

        let pitch1 = sin_pitch.asin().to_degrees();
        let pitch2 = normalize_degrees(180.0 - pitch1);

        let roll1 = m[(2, 1)].atan2(m[(2, 2)]).to_degrees();
        let roll2 = (-m[(2, 1)]).atan2(-m[(2, 2)]).to_degrees();

        let yaw1 = m[(1, 0)].atan2(m[(0, 0)]).to_degrees();
        let yaw2 = (-m[(1, 0)]).atan2(-m[(0, 0)]).to_degrees();

        RpySolutions {
            main: RpyRotation::new(roll1, pitch1, yaw1),
            alt: RpyRotation::new(roll2, pitch2, yaw2),
        }
    }
}

/// 将角度归一化到 (-180°, 180°]
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// 由工具指向（工具 Z 轴）求 RPY
///
/// 构造把世界 +Z 转到 `direction` 的最小旋转（Rodrigues 公式，
/// 转轴为 `ez × direction`），再分解为两组 RPY 解。
/// `direction` 与 -Z 反向平行时取绕 X 轴 180° 的旋转。
///
/// # 错误
///
/// `direction` 长度接近 0 时返回 [`GeometryError::DegenerateVector`]。
pub fn rpy_from_direction(direction: Vector3) -> Result<RpySolutions, GeometryError> {
    let u = direction.normalize()?;
    let ez = Vector3::UNIT_Z;

    let axis = ez.cross(&u);
    let sin = axis.length();
    let cos = ez.dot(&u);

    let rotation = if sin < GIMBAL_LOCK_EPSILON {
        if cos > 0.0 {
            RotationMatrix::identity()
        } else {
            RotationMatrix::from_rows([[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]])
        }
    } else {
        let k = axis / sin;
        let skew = RotationMatrix::from_rows([
            [0.0, -k.dz, k.dy],
            [k.dz, 0.0, -k.dx],
            [-k.dy, k.dx, 0.0],
        ]);
        let skew_sq = skew * skew;
        let rows_i = RotationMatrix::identity().to_rows();
        let rows_k = skew.to_rows();
        let rows_k2 = skew_sq.to_rows();
        let mut rows = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                rows[r][c] = rows_i[r][c] + sin * rows_k[r][c] + (1.0 - cos) * rows_k2[r][c];
            }
        }
        RotationMatrix::from_rows(rows)
    };

    Ok(rotation.to_rpy())
}

/// 以 `direction` 为第一轴的任意正交单位基
///
/// 第二轴取 `direction × ez`（`direction` 平行于 Z 时改用 `ex`），
/// 第三轴为前两者的叉积。
pub fn orthogonal_basis(direction: Vector3) -> Result<[Vector3; 3], GeometryError> {
    let axis1 = direction.normalize()?;
    let axis2 = match axis1.cross(&Vector3::UNIT_Z).normalize() {
        Ok(axis) => axis,
        Err(_) => axis1.cross(&Vector3::UNIT_X).normalize()?,
    };
    let axis3 = axis1.cross(&axis2);
    Ok([axis1, axis2, axis3])
}

/// 指向标定平面的工具姿态
///
/// 工具 Z 轴垂直于平面并指向平面内部（与朝向 `up_reference` 的法线相反），
/// 工具 X 轴沿平面 X 轴方向。
///
/// # 错误
///
/// 三点共线或重合时返回 [`GeometryError::DegenerateVector`]。
pub fn plane_orientation(
    zero: Point,
    axis_x_point: Point,
    axis_y_point: Point,
    up_reference: Point,
) -> Result<RpySolutions, GeometryError> {
    let x_dir = (axis_x_point - zero).normalize()?;
    let y_dir = (axis_y_point - zero).normalize()?;
    let mut normal = x_dir.cross(&y_dir).normalize()?;
    if (up_reference - zero).dot(&normal) <= 0.0 {
        normal = -normal;
    }

    let tool_z = -normal;
    let tool_y = tool_z.cross(&x_dir);
    Ok(RotationMatrix::from_columns(x_dir, tool_y, tool_z).to_rpy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_from_rpy_identity() {
        let m = RotationMatrix::from_rpy(0.0, 0.0, 0.0, AngleUnit::Degrees);
        assert!(m.approx_eq(&RotationMatrix::identity(), 1e-15));
    }

    #[test]
    fn test_from_rpy_elemental_yaw() {
        let m = RotationMatrix::from_rpy(0.0, 0.0, 90.0, AngleUnit::Degrees);
        assert!((m * Vector3::UNIT_X).approx_eq(&Vector3::UNIT_Y, 1e-12));
    }

    #[test]
    fn test_from_rpy_units_agree() {
        let deg = RotationMatrix::from_rpy(30.0, -20.0, 110.0, AngleUnit::Degrees);
        let rad = RotationMatrix::from_rpy(
            30f64.to_radians(),
            (-20f64).to_radians(),
            110f64.to_radians(),
            AngleUnit::Radians,
        );
        assert!(deg.approx_eq(&rad, 1e-15));
    }

    #[test]
    fn test_from_rpy_matches_vector_rotation() {
        // 矩阵约定必须与向量依次绕 X、Y、Z 旋转一致
        let v = Vector3::new(0.3, -1.2, 2.0);
        let (r, p, y) = (0.4, -0.7, 2.1);
        let by_matrix = RotationMatrix::from_rpy(r, p, y, AngleUnit::Radians) * v;
        let by_vector = v.rotate_xyz(r, p, y);
        assert!(by_matrix.approx_eq(&by_vector, 1e-12));
    }

    #[test]
    fn test_to_rpy_canvas_default() {
        // 朝下的默认画布姿态 (180, 0, 0)
        let m = RotationMatrix::from_rpy(180.0, 0.0, 0.0, AngleUnit::Degrees);
        let solutions = m.to_rpy();
        assert_relative_eq!(solutions.main.roll.abs(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(solutions.main.pitch, 0.0, epsilon = 1e-9);
        assert!(solutions.alt.to_matrix().approx_eq(&m, 1e-9));
    }

    #[test]
    fn test_to_rpy_alt_solution_values() {
        let m = RotationMatrix::from_rpy(10.0, 20.0, 30.0, AngleUnit::Degrees);
        let s = m.to_rpy();
        assert!(s.main.approx_eq(&RpyRotation::new(10.0, 20.0, 30.0), 1e-9));
        assert!(s.alt.approx_eq(&RpyRotation::new(-170.0, 160.0, -150.0), 1e-9), "{}", s.alt);
    }

    #[test]
    fn test_to_rpy_gimbal_lock() {
        for pitch in [90.0, -90.0] {
            let m = RotationMatrix::from_rpy(25.0, pitch, 40.0, AngleUnit::Degrees);
            let s = m.to_rpy();
            assert!(!s.main.roll.is_nan() && !s.main.yaw.is_nan());
            assert_eq!(s.main.yaw, 0.0);
            assert_relative_eq!(s.main.pitch, pitch, epsilon = 1e-9);
            assert_eq!(s.main, s.alt);
            assert!(
                s.main.to_matrix().approx_eq(&m, 1e-9),
                "pitch {}: {} does not reconstruct",
                pitch,
                s.main
            );
        }
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(540.0), 180.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
    }

    #[test]
    fn test_rpy_from_direction() {
        let directions = [
            Vector3::UNIT_Z,
            -Vector3::UNIT_Z,
            Vector3::UNIT_X,
            Vector3::new(1.0, 2.0, -3.0),
            Vector3::new(0.0, 0.0, -5.0),
        ];
        for d in directions {
            let s = rpy_from_direction(d).unwrap();
            let expected = d.normalize().unwrap();
            for solution in [s.main, s.alt] {
                let z = solution.to_matrix() * Vector3::UNIT_Z;
                assert!(z.approx_eq(&expected, 1e-9), "dir {} -> {}", d, z);
            }
        }
    }

    #[test]
    fn test_rpy_from_direction_degenerate() {
        assert!(rpy_from_direction(Vector3::ZERO).is_err());
    }

    #[test]
    fn test_orthogonal_basis() {
        for d in [Vector3::new(1.0, 1.0, 0.0), Vector3::UNIT_Z, Vector3::new(-2.0, 0.5, 3.0)] {
            let [a, b, c] = orthogonal_basis(d).unwrap();
            assert_relative_eq!(a.length(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(b.length(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(c.length(), 1.0, epsilon = 1e-12);
            assert!(a.dot(&b).abs() < 1e-12);
            assert!(a.dot(&c).abs() < 1e-12);
            assert!(b.dot(&c).abs() < 1e-12);
        }
    }

    #[test]
    fn test_plane_orientation_points_into_plane() {
        // 水平桌面，工具从上方接近：工具 Z 轴应朝下
        let s = plane_orientation(
            Vector3::ZERO,
            Vector3::new(100.0, 0.0, 0.0),
            Vector3::new(0.0, 50.0, 0.0),
            Vector3::new(0.0, 0.0, 10.0),
        )
        .unwrap();
        let m = s.main.to_matrix();
        assert!((m * Vector3::UNIT_Z).approx_eq(&-Vector3::UNIT_Z, 1e-9));
        assert!((m * Vector3::UNIT_X).approx_eq(&Vector3::UNIT_X, 1e-9));
    }

    #[test]
    fn test_plane_orientation_collinear() {
        let result = plane_orientation(
            Vector3::ZERO,
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::UNIT_Z,
        );
        assert!(matches!(result, Err(GeometryError::DegenerateVector { .. })));
    }

    proptest! {
        #[test]
        fn prop_rpy_round_trip_main(
            roll in -179.0f64..179.0,
            pitch in -89.0f64..89.0,
            yaw in -179.0f64..179.0,
        ) {
            let m = RotationMatrix::from_rpy(roll, pitch, yaw, AngleUnit::Degrees);
            let main = m.to_rpy().main;
            prop_assert!(
                main.approx_eq(&RpyRotation::new(roll, pitch, yaw), 1e-6),
                "input ({}, {}, {}) -> {}", roll, pitch, yaw, main
            );
        }

        #[test]
        fn prop_both_solutions_reconstruct(
            roll in -180.0f64..180.0,
            pitch in -180.0f64..180.0,
            yaw in -180.0f64..180.0,
        ) {
            let m = RotationMatrix::from_rpy(roll, pitch, yaw, AngleUnit::Degrees);
            // 接近万向节锁时由专门的测试覆盖
            prop_assume!(m[(2, 1)].hypot(m[(2, 2)]) > 1e-4);
            let s = m.to_rpy();
            prop_assert!(s.main.to_matrix().approx_eq(&m, 1e-9));
            prop_assert!(s.alt.to_matrix().approx_eq(&m, 1e-9));
        }
    }
}
