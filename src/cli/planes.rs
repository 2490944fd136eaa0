//! # planes 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/planes.rs`

use clap::Args;
use std::path::PathBuf;

/// planes 子命令参数
#[derive(Args, Debug)]
pub struct PlanesArgs {
    /// Material file (.ncmat) with a @CUSTOM_CRYSTEXT section
    pub input: PathBuf,

    /// Minimum d-spacing in Å
    #[arg(long, default_value_t = 0.5)]
    pub dmin: f64,

    /// Number of planes printed to the terminal
    #[arg(long, default_value_t = 20)]
    pub show: usize,

    /// Write the full plane list to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
