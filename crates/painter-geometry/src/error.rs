//! 几何层错误类型定义

use thiserror::Error;

/// 几何前置条件错误
///
/// 这些错误都在发起任何网络往返之前被检查，
/// 保证错误的标定输入不会到达硬件。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// 向量长度接近 0，无法归一化
    #[error("Degenerate vector: length {length:.3e} is below {threshold:.0e}")]
    DegenerateVector {
        /// 实际长度
        length: f64,
        /// 判定阈值
        threshold: f64,
    },

    /// 矩阵奇异（某一列找不到非零主元）
    #[error("Singular matrix: no usable pivot in column {column}")]
    SingularMatrix {
        /// 失败的列索引
        column: usize,
    },
}
