//! # xs 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/xs.rs`

use super::{parse_direction, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// xs 子命令参数
#[derive(Args, Debug)]
pub struct XsArgs {
    /// Input: material file (.ncmat) or directory containing material files
    pub input: PathBuf,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "xs.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Wavelength range in Å (e.g., "0.5-20")
    #[arg(long, default_value = "0.5-20")]
    pub wl_range: String,

    /// Number of wavelength points
    #[arg(long, default_value_t = 400)]
    pub points: usize,

    /// Incident direction in the lab frame (texture models only)
    #[arg(long, value_parser = parse_direction, default_value = "0,0,1")]
    pub direction: [f64; 3],

    /// Minimum d-spacing in Å for the texture plane list
    #[arg(long, default_value_t = 0.5)]
    pub dmin: f64,

    /// Number of table rows printed to the terminal
    #[arg(long, default_value_t = 12)]
    pub show: usize,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: material name)
    #[arg(long)]
    pub title: Option<String>,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, e.g., "*.ncmat")
    #[arg(long, default_value = "*.ncmat")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
