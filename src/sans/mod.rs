//! # 小角中子散射模块
//!
//! ## 子模块
//! - `params`: `@CUSTOM_SANSND` 配置解析与校验
//! - `intensity`: Guinier-Porod 与硬球 I(Q) 合成
//! - `iofq`: I(Q) -> 截面曲线与 Q 抽样
//! - `ppf`: 分段幂律的解析截面与抽样
//! - `model`: SANSND 模型
//! - `isotropic`: SANSISO 模型
//!
//! ## 依赖关系
//! - 被 `scatter.rs` 使用
//! - 使用 `math/`、`models/`、`parsers/table.rs`

pub mod intensity;
pub mod iofq;
pub mod isotropic;
pub mod model;
pub mod params;
pub mod ppf;

pub use isotropic::IsotropicSans;
pub use model::SansModel;
