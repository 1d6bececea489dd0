//! 3×3 旋转矩阵
//!
//! 存储使用 `nalgebra::Matrix3`，求逆与线性方程组求解使用带部分主元的
//! Gauss-Jordan 消元，奇异时返回 [`GeometryError::SingularMatrix`]。
//!
//! 列向量被约定为正交单位向量，但本类型不强制这一点：
//! 调用方需要从正交输入构造，或自行重新正交化。

use crate::error::GeometryError;
use crate::vector::Vector3;
use nalgebra::Matrix3;
use std::fmt;
use std::ops::{Index, Mul};

/// 主元绝对值低于此值视为零
pub const PIVOT_EPSILON: f64 = 1e-12;

/// 3×3 旋转矩阵（行优先索引 `m[(row, col)]`）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix(Matrix3<f64>);

impl RotationMatrix {
    /// 单位矩阵
    pub fn identity() -> Self {
        RotationMatrix(Matrix3::identity())
    }

    /// 按行构造
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        RotationMatrix(Matrix3::new(
            rows[0][0], rows[0][1], rows[0][2], //
            rows[1][0], rows[1][1], rows[1][2], //
            rows[2][0], rows[2][1], rows[2][2],
        ))
    }

    /// 以三个向量为列构造（例如一组坐标轴）
    pub fn from_columns(x: Vector3, y: Vector3, z: Vector3) -> Self {
        RotationMatrix(Matrix3::from_columns(&[
            x.to_nalgebra(),
            y.to_nalgebra(),
            z.to_nalgebra(),
        ]))
    }

    /// 导出为行数组
    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// 第 `index` 列
    pub fn column(&self, index: usize) -> Vector3 {
        Vector3::from_nalgebra(&self.0.column(index).into_owned())
    }

    /// 转置
    pub fn transpose(&self) -> Self {
        RotationMatrix(self.0.transpose())
    }

    /// 各元素四舍五入到 `digits` 位小数
    pub fn rounded(&self, digits: u32) -> Self {
        let scale = 10f64.powi(digits as i32);
        RotationMatrix(self.0.map(|v| (v * scale).round() / scale))
    }

    /// 行列式
    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// 逆矩阵（Gauss-Jordan 消元，部分主元）
    ///
    /// # 错误
    ///
    /// 某一列在当前行及以下找不到绝对值不小于 [`PIVOT_EPSILON`] 的主元时，
    /// 返回 [`GeometryError::SingularMatrix`]。
    pub fn inverse(&self) -> Result<Self, GeometryError> {
        let mut left = self.to_rows();
        let mut right = RotationMatrix::identity().to_rows();

        for col in 0..3 {
            let pivot_row = select_pivot(&left, col)?;
            if pivot_row != col {
                left.swap(pivot_row, col);
                right.swap(pivot_row, col);
            }

            let pivot = left[col][col];
            for k in 0..3 {
                left[col][k] /= pivot;
                right[col][k] /= pivot;
            }

            for row in 0..3 {
                if row == col {
                    continue;
                }
                let factor = left[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..3 {
                    left[row][k] -= factor * left[col][k];
                    right[row][k] -= factor * right[col][k];
                }
            }
        }

        Ok(RotationMatrix::from_rows(right))
    }

    /// 元素级近似比较
    pub fn approx_eq(&self, other: &RotationMatrix, tolerance: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// 求解线性方程组 `A·x = b`
///
/// 与 [`RotationMatrix::inverse`] 使用相同的消元过程，奇异时返回
/// [`GeometryError::SingularMatrix`]。
pub fn solve_linear(a: &RotationMatrix, b: Vector3) -> Result<Vector3, GeometryError> {
    let mut left = a.to_rows();
    let mut rhs = b.to_array();

    for col in 0..3 {
        let pivot_row = select_pivot(&left, col)?;
        if pivot_row != col {
            left.swap(pivot_row, col);
            rhs.swap(pivot_row, col);
        }

        let pivot = left[col][col];
        for k in 0..3 {
            left[col][k] /= pivot;
        }
        rhs[col] /= pivot;

        for row in 0..3 {
            if row == col {
                continue;
            }
            let factor = left[row][col];
            for k in 0..3 {
                left[row][k] -= factor * left[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    Ok(Vector3::from_array(rhs))
}

fn select_pivot(rows: &[[f64; 3]; 3], col: usize) -> Result<usize, GeometryError> {
    let mut best = col;
    for row in (col + 1)..3 {
        if rows[row][col].abs() > rows[best][col].abs() {
            best = row;
        }
    }
    if !(rows[best][col].abs() >= PIVOT_EPSILON) {
        return Err(GeometryError::SingularMatrix { column: col });
    }
    Ok(best)
}

impl Default for RotationMatrix {
    fn default() -> Self {
        RotationMatrix::identity()
    }
}

impl Index<(usize, usize)> for RotationMatrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.0[index]
    }
}

impl Mul for RotationMatrix {
    type Output = RotationMatrix;

    fn mul(self, rhs: RotationMatrix) -> RotationMatrix {
        RotationMatrix(self.0 * rhs.0)
    }
}

impl Mul<Vector3> for RotationMatrix {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        Vector3::from_nalgebra(&(self.0 * rhs.to_nalgebra()))
    }
}

impl Mul<f64> for RotationMatrix {
    type Output = RotationMatrix;

    fn mul(self, rhs: f64) -> RotationMatrix {
        RotationMatrix(self.0 * rhs)
    }
}

impl fmt::Display for RotationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.to_rows();
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{:>9.5} {:>9.5} {:>9.5}]", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RotationMatrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RotationMatrix {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = <[[f64; 3]; 3]>::deserialize(deserializer)?;
        Ok(RotationMatrix::from_rows(rows))
    }
}
