//! # sample 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sample.rs`

use super::{parse_direction, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// sample 子命令参数
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Material file (.ncmat)
    pub input: PathBuf,

    /// Neutron wavelength in Å
    #[arg(short, long)]
    pub wavelength: f64,

    /// Number of events to sample
    #[arg(short, long, default_value_t = 100_000)]
    pub events: u64,

    /// Base seed for the per-chunk random streams
    #[arg(long, default_value_t = 2024)]
    pub seed: u64,

    /// Incident direction in the lab frame
    #[arg(long, value_parser = parse_direction, default_value = "0,0,1")]
    pub direction: [f64; 3],

    /// Minimum d-spacing in Å for the texture plane list
    #[arg(long, default_value_t = 0.5)]
    pub dmin: f64,

    /// Number of μ histogram bins
    #[arg(long, default_value_t = 200)]
    pub bins: usize,

    /// Output file for the μ histogram (skipped if not given)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
