//! # 数值工具模块
//!
//! 查找表、分段线性分布、网格与三维向量运算。

pub mod grid;
pub mod lookup;
pub mod pointwise;
pub mod vector;

pub use lookup::{Extrapolate, LookUpTable};
pub use pointwise::PointwiseDist;
pub use vector::{RotMatrix, Vec3};
