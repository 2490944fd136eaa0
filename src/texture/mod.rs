//! # 晶体织构模块
//!
//! ## 子模块
//! - `scatlen`: 元素相干散射长度表
//! - `planes`: 晶面列表与结构因子
//! - `pddf`: March-Dollase 极密度
//! - `model`: CRYSTEXT 模型
//!
//! ## 依赖关系
//! - 被 `scatter.rs` 使用
//! - 使用 `math/`、`models/`

pub mod model;
pub mod pddf;
pub mod planes;
pub mod scatlen;

pub use model::{CrystallineTexture, TextureConfig};
pub use planes::{PlaneProvider, StdPlaneProvider};
