//! # Painter Geometry
//!
//! 画图机械臂的几何与旋转库：三维向量、3×3 旋转矩阵、Roll-Pitch-Yaw 分解、
//! 位姿类型。所有运算都是纯函数，没有副作用。
//!
//! ## 约定
//!
//! - 长度单位与控制器一致（毫米），角度对外一律使用角度制
//! - 旋转顺序 `R = Rz(yaw) · Ry(pitch) · Rx(roll)`
//! - 矩阵索引 `m[(row, col)]`
//!
//! ## 示例
//!
//! ```rust
//! use painter_geometry::{AngleUnit, RotationMatrix, RpyRotation};
//!
//! let m = RotationMatrix::from_rpy(10.0, 20.0, 30.0, AngleUnit::Degrees);
//! let solutions = m.to_rpy();
//! assert!(solutions.main.approx_eq(&RpyRotation::new(10.0, 20.0, 30.0), 1e-9));
//! assert!(solutions.alt.to_matrix().approx_eq(&m, 1e-9));
//! ```

pub mod error;
pub mod matrix;
pub mod pose;
pub mod rotation;
pub mod vector;

pub use error::GeometryError;
pub use matrix::{PIVOT_EPSILON, RotationMatrix, solve_linear};
pub use pose::{CartesianPose, JOINT_COUNT, JointAngles};
pub use rotation::{
    AngleUnit, GIMBAL_LOCK_EPSILON, RpyRotation, RpySolutions, normalize_degrees,
    orthogonal_basis, plane_orientation, rpy_from_direction,
};
pub use vector::{DEGENERATE_LENGTH_THRESHOLD, Point, Vector3};
