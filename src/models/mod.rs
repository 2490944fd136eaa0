//! # 数据模型模块
//!
//! 晶体结构与材料信息。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`sans/`、`texture/` 和 `commands/` 使用
//! - 子模块: structure, material

pub mod material;
pub mod structure;

pub use material::{CustomSection, MaterialInfo, ScatteringDensity};
pub use structure::{Atom, Crystal, Lattice};
