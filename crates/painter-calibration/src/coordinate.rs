//! 画布坐标系
//!
//! [`CoordinateSystem2D`] 由三个世界坐标点（零点、X 轴点、Y 轴点）构建，
//! 把画布坐标 `(x, y, z)` 映射到世界坐标：
//!
//! ```text
//! world = zero + axis_x_dir * x + axis_y_dir * y + z_shift_dir * z
//! ```
//!
//! 缓存的方向向量已经除以 `units_per_length`，边界已经乘以
//! `units_per_length`，所以画布坐标直接以画布单位给出。

use crate::error::CalibrationError;
use painter_geometry::{
    CartesianPose, Point, RotationMatrix, RpyRotation, Vector3, solve_linear,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// 边界判断容差（画布单位）
pub const BOUNDS_TOLERANCE: f64 = 1e-9;

/// 上方参考点到平面的最小距离
pub const MIN_UP_REFERENCE_DISTANCE: f64 = 1e-9;

/// 标定后的 2D 画布坐标系（嵌入 3D 世界坐标）
///
/// 构建后不可变，唯一的修改是 [`rescale`](Self::rescale)。
/// X、Y 轴不强制正交，正交程度取决于采样精度。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem2D {
    zero: Point,
    axis_x_point: Point,
    axis_y_point: Point,
    orientation: RpyRotation,
    units_per_length: f64,
    axis_x_dir: Vector3,
    axis_y_dir: Vector3,
    z_shift_dir: Vector3,
    max_x: f64,
    max_y: f64,
}

impl CoordinateSystem2D {
    /// 由三个点构建坐标系
    ///
    /// # 参数
    ///
    /// - `zero`: 画布原点
    /// - `axis_x_point`: 画布 +X 轴上的点，到原点的距离即 X 方向范围
    /// - `axis_y_point`: 画布 +Y 轴上的点
    /// - `orientation`: 在画布上作业时的工具姿态
    /// - `units_per_length`: 画布单位 / 世界长度单位
    /// - `up_reference`: 平面"上方"的参考点（通常是采样零点时的工具位置），
    ///   Z 偏移方向指向它所在的一侧
    ///
    /// # 错误
    ///
    /// - `InvalidScale`: `units_per_length` 不是正有限数
    /// - `Geometry`: 轴点与原点重合，或三点共线
    /// - `AmbiguousSurfaceSide`: 参考点落在平面上
    pub fn build(
        zero: Point,
        axis_x_point: Point,
        axis_y_point: Point,
        orientation: RpyRotation,
        units_per_length: f64,
        up_reference: Point,
    ) -> Result<Self, CalibrationError> {
        check_scale(units_per_length)?;

        let x_vec = axis_x_point - zero;
        let y_vec = axis_y_point - zero;
        let x_dir = x_vec.normalize()?;
        let y_dir = y_vec.normalize()?;

        let mut z_dir = x_dir.cross(&y_dir).normalize()?;
        let side = (up_reference - zero).dot(&z_dir);
        if side.abs() < MIN_UP_REFERENCE_DISTANCE {
            return Err(CalibrationError::AmbiguousSurfaceSide { distance: side });
        }
        if side <= 0.0 {
            z_dir = -z_dir;
        }

        let system = Self {
            zero,
            axis_x_point,
            axis_y_point,
            orientation,
            units_per_length,
            axis_x_dir: x_dir / units_per_length,
            axis_y_dir: y_dir / units_per_length,
            z_shift_dir: z_dir / units_per_length,
            max_x: x_vec.length() * units_per_length,
            max_y: y_vec.length() * units_per_length,
        };
        info!("Coordinate system built: {}", system);
        Ok(system)
    }

    /// 画布坐标是否在标定范围内（X、Y 同时满足）
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (-BOUNDS_TOLERANCE..=self.max_x + BOUNDS_TOLERANCE).contains(&x)
            && (-BOUNDS_TOLERANCE..=self.max_y + BOUNDS_TOLERANCE).contains(&y)
    }

    /// 画布坐标 → 世界坐标
    ///
    /// `z` 为沿平面法线（指向上方）的偏移，正值抬起、负值压入。
    ///
    /// # 错误
    ///
    /// `x` 或 `y` 超出 `[0, max]` 时返回 `OutOfBounds`。
    pub fn canvas_to_world(&self, x: f64, y: f64, z: f64) -> Result<Point, CalibrationError> {
        if !self.contains(x, y) || !z.is_finite() {
            return Err(CalibrationError::OutOfBounds {
                x,
                y,
                max_x: self.max_x,
                max_y: self.max_y,
            });
        }
        Ok(self.zero + self.axis_x_dir * x + self.axis_y_dir * y + self.z_shift_dir * z)
    }

    /// 画布坐标 → 带工具姿态的世界位姿
    pub fn canvas_to_pose(&self, x: f64, y: f64, z: f64) -> Result<CartesianPose, CalibrationError> {
        let position = self.canvas_to_world(x, y, z)?;
        Ok(CartesianPose::new(position, self.orientation))
    }

    /// 世界坐标 → 画布坐标 `(x, y, z)`
    ///
    /// 轴不一定正交，按斜坐标求解线性方程组；不做边界检查。
    pub fn world_to_canvas(&self, point: Point) -> Result<(f64, f64, f64), CalibrationError> {
        let basis = RotationMatrix::from_columns(self.axis_x_dir, self.axis_y_dir, self.z_shift_dir);
        let canvas = solve_linear(&basis, point - self.zero)?;
        Ok((canvas.dx, canvas.dy, canvas.dz))
    }

    /// 更换画布单位
    ///
    /// 同一物理点在新单位下的画布坐标按比例变化，边界同步缩放。
    pub fn rescale(&mut self, units_per_length: f64) -> Result<(), CalibrationError> {
        check_scale(units_per_length)?;
        let ratio = self.units_per_length / units_per_length;
        self.axis_x_dir = self.axis_x_dir * ratio;
        self.axis_y_dir = self.axis_y_dir * ratio;
        self.z_shift_dir = self.z_shift_dir * ratio;
        self.max_x /= ratio;
        self.max_y /= ratio;
        self.units_per_length = units_per_length;
        Ok(())
    }

    /// 检查反序列化得到的记录是否自洽
    pub fn validate(&self) -> Result<(), CalibrationError> {
        check_scale(self.units_per_length)?;
        let rebuilt = Self::build(
            self.zero,
            self.axis_x_point,
            self.axis_y_point,
            self.orientation,
            self.units_per_length,
            self.zero + self.z_shift_dir * self.units_per_length,
        )?;
        let consistent = rebuilt.axis_x_dir.approx_eq(&self.axis_x_dir, 1e-6)
            && rebuilt.axis_y_dir.approx_eq(&self.axis_y_dir, 1e-6)
            && (rebuilt.max_x - self.max_x).abs() <= 1e-6 * self.max_x.max(1.0)
            && (rebuilt.max_y - self.max_y).abs() <= 1e-6 * self.max_y.max(1.0);
        if consistent {
            Ok(())
        } else {
            Err(CalibrationError::CorruptRecord {
                reason: "cached axes or bounds do not match the calibration points".to_string(),
            })
        }
    }

    pub fn zero(&self) -> Point {
        self.zero
    }

    pub fn axis_x_point(&self) -> Point {
        self.axis_x_point
    }

    pub fn axis_y_point(&self) -> Point {
        self.axis_y_point
    }

    /// 作业时的工具姿态
    pub fn orientation(&self) -> RpyRotation {
        self.orientation
    }

    pub fn units_per_length(&self) -> f64 {
        self.units_per_length
    }

    /// 每画布单位对应的 X 方向世界位移
    pub fn axis_x_dir(&self) -> Vector3 {
        self.axis_x_dir
    }

    /// 每画布单位对应的 Y 方向世界位移
    pub fn axis_y_dir(&self) -> Vector3 {
        self.axis_y_dir
    }

    /// 每画布单位对应的法线方向世界位移（指向上方）
    pub fn z_shift_dir(&self) -> Vector3 {
        self.z_shift_dir
    }

    /// X 方向范围（画布单位）
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Y 方向范围（画布单位）
    pub fn max_y(&self) -> f64 {
        self.max_y
    }
}

fn check_scale(units_per_length: f64) -> Result<(), CalibrationError> {
    if units_per_length.is_finite() && units_per_length > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::InvalidScale(units_per_length))
    }
}

impl fmt::Display for CoordinateSystem2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zero {} | X {} | Y {} | extent {:.3} x {:.3} ({} units/length)",
            self.zero,
            self.axis_x_point,
            self.axis_y_point,
            self.max_x,
            self.max_y,
            self.units_per_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use painter_geometry::GeometryError;
    use proptest::prelude::*;

    fn flat_canvas() -> CoordinateSystem2D {
        CoordinateSystem2D::build(
            Vector3::ZERO,
            Vector3::new(100.0, 0.0, 0.0),
            Vector3::new(0.0, 50.0, 0.0),
            RpyRotation::new(180.0, 0.0, 0.0),
            1.0,
            Vector3::new(0.0, 0.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_canvas_to_world_flat() {
        let cs = flat_canvas();
        assert_eq!(cs.max_x(), 100.0);
        assert_eq!(cs.max_y(), 50.0);
        let p = cs.canvas_to_world(50.0, 25.0, 10.0).unwrap();
        assert!(p.approx_eq(&Vector3::new(50.0, 25.0, 10.0), 1e-12));
    }

    #[test]
    fn test_axis_points_map_exactly() {
        let cs = CoordinateSystem2D::build(
            Vector3::new(412.3, -87.1, 95.0),
            Vector3::new(612.9, -80.4, 97.2),
            Vector3::new(405.0, 112.6, 93.1),
            RpyRotation::default(),
            1.0,
            Vector3::new(410.0, -85.0, 300.0),
        )
        .unwrap();

        assert!(cs.canvas_to_world(0.0, 0.0, 0.0).unwrap().approx_eq(&cs.zero(), 1e-9));
        assert!(
            cs.canvas_to_world(cs.max_x(), 0.0, 0.0)
                .unwrap()
                .approx_eq(&cs.axis_x_point(), 1e-9)
        );
        assert!(
            cs.canvas_to_world(0.0, cs.max_y(), 0.0)
                .unwrap()
                .approx_eq(&cs.axis_y_point(), 1e-9)
        );
    }

    #[test]
    fn test_bounds_require_both_axes() {
        let cs = flat_canvas();
        // X 越界但 Y 在范围内
        assert!(matches!(
            cs.canvas_to_world(101.0, 10.0, 0.0),
            Err(CalibrationError::OutOfBounds { .. })
        ));
        // Y 越界但 X 在范围内
        assert!(matches!(
            cs.canvas_to_world(10.0, 51.0, 0.0),
            Err(CalibrationError::OutOfBounds { .. })
        ));
        assert!(cs.canvas_to_world(-0.5, 10.0, 0.0).is_err());
        assert!(cs.canvas_to_world(f64::NAN, 10.0, 0.0).is_err());
        assert!(cs.canvas_to_world(100.0, 50.0, 0.0).is_ok());
    }

    #[test]
    fn test_z_shift_follows_up_reference() {
        let below = CoordinateSystem2D::build(
            Vector3::ZERO,
            Vector3::new(100.0, 0.0, 0.0),
            Vector3::new(0.0, 50.0, 0.0),
            RpyRotation::default(),
            1.0,
            Vector3::new(3.0, 4.0, -20.0),
        )
        .unwrap();
        assert!(below.z_shift_dir().approx_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-12));

        // 轴点顺序交换后叉积方向相反，参考点仍决定结果
        let swapped = CoordinateSystem2D::build(
            Vector3::ZERO,
            Vector3::new(0.0, 50.0, 0.0),
            Vector3::new(100.0, 0.0, 0.0),
            RpyRotation::default(),
            1.0,
            Vector3::new(0.0, 0.0, 5.0),
        )
        .unwrap();
        assert!(swapped.z_shift_dir().approx_eq(&Vector3::UNIT_Z, 1e-12));
    }

    #[test]
    fn test_degenerate_inputs() {
        let coincident = CoordinateSystem2D::build(
            Vector3::ZERO,
            Vector3::ZERO,
            Vector3::new(0.0, 50.0, 0.0),
            RpyRotation::default(),
            1.0,
            Vector3::UNIT_Z,
        );
        assert!(matches!(
            coincident,
            Err(CalibrationError::Geometry(GeometryError::DegenerateVector { .. }))
        ));

        let collinear = CoordinateSystem2D::build(
            Vector3::ZERO,
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(20.0, 0.0, 0.0),
            RpyRotation::default(),
            1.0,
            Vector3::UNIT_Z,
        );
        assert!(matches!(collinear, Err(CalibrationError::Geometry(_))));

        let on_plane = CoordinateSystem2D::build(
            Vector3::ZERO,
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 10.0, 0.0),
            RpyRotation::default(),
            1.0,
            Vector3::new(5.0, 5.0, 0.0),
        );
        assert!(matches!(
            on_plane,
            Err(CalibrationError::AmbiguousSurfaceSide { .. })
        ));

        assert!(matches!(
            CoordinateSystem2D::build(
                Vector3::ZERO,
                Vector3::UNIT_X,
                Vector3::UNIT_Y,
                RpyRotation::default(),
                0.0,
                Vector3::UNIT_Z,
            ),
            Err(CalibrationError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_rescale_keeps_physical_points() {
        let mut cs = flat_canvas();
        let before = cs.canvas_to_world(40.0, 20.0, 5.0).unwrap();

        // 毫米 → 厘米
        cs.rescale(0.1).unwrap();
        assert_relative_eq!(cs.max_x(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(cs.max_y(), 5.0, epsilon = 1e-12);
        let after = cs.canvas_to_world(4.0, 2.0, 0.5).unwrap();
        assert!(after.approx_eq(&before, 1e-9));
        let corner = cs.canvas_to_world(10.0, 5.0, 0.0).unwrap();
        assert!(corner.approx_eq(&(cs.axis_x_point() + cs.axis_y_point()), 1e-9));

        assert!(cs.rescale(-1.0).is_err());
        assert_eq!(cs.units_per_length(), 0.1);
    }

    #[test]
    fn test_world_to_canvas() {
        let mut cs = flat_canvas();
        cs.rescale(2.0).unwrap();
        let (x, y, z) = cs.world_to_canvas(Vector3::new(30.0, 10.0, 4.0)).unwrap();
        assert_relative_eq!(x, 60.0, epsilon = 1e-9);
        assert_relative_eq!(y, 20.0, epsilon = 1e-9);
        assert_relative_eq!(z, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_canvas_to_pose_carries_orientation() {
        let cs = flat_canvas();
        let pose = cs.canvas_to_pose(1.0, 2.0, 0.0).unwrap();
        assert_eq!(pose.orientation, RpyRotation::new(180.0, 0.0, 0.0));
    }

    #[test]
    fn test_json_round_trip_and_validate() {
        let mut cs = flat_canvas();
        cs.rescale(4.0).unwrap();
        let json = serde_json::to_string(&cs).unwrap();
        let restored: CoordinateSystem2D = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cs);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_record() {
        let cs = flat_canvas();
        let mut value = serde_json::to_value(&cs).unwrap();
        value["max_x"] = serde_json::json!(250.0);
        let tampered: CoordinateSystem2D = serde_json::from_value(value).unwrap();
        assert!(tampered.validate().is_err());
    }

    fn coord() -> impl Strategy<Value = f64> {
        -500.0..500.0f64
    }

    proptest! {
        #[test]
        fn prop_z_shift_points_to_up_reference(
            zero in prop::array::uniform3(coord()),
            axis_x in prop::array::uniform3(coord()),
            axis_y in prop::array::uniform3(coord()),
            up in prop::array::uniform3(coord()),
        ) {
            let zero = Vector3::from_array(zero);
            let up = Vector3::from_array(up);
            let result = CoordinateSystem2D::build(
                zero,
                Vector3::from_array(axis_x),
                Vector3::from_array(axis_y),
                RpyRotation::default(),
                1.0,
                up,
            );
            if let Ok(cs) = result {
                prop_assert!((up - zero).dot(&cs.z_shift_dir()) > 0.0);
            }
        }
    }
}
