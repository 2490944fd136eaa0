//! # 解析器模块
//!
//! 材料文件与数值表的解析器。
//!
//! ## 依赖关系
//! - 被 `scatter.rs`、`sans/`、`commands/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: ncmat, table

pub mod ncmat;
pub mod table;

use crate::error::{Result, SansError};
use crate::models::MaterialInfo;
use std::path::Path;

/// 从文件路径推断格式并解析材料文件
pub fn parse_material_file(path: &Path) -> Result<MaterialInfo> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "ncmat" => ncmat::parse_ncmat_file(path),
        _ => Err(SansError::UnsupportedFormat(format!(
            "Cannot determine material format for: {}",
            path.display()
        ))),
    }
}
