//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `xs`: 截面随波长变化（支持目录批量）
//! - `sample`: 抽样散射事件，统计 μ 分布
//! - `planes`: 列出织构模型使用的晶面
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: xs, sample, planes

pub mod planes;
pub mod sample;
pub mod xs;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// sanstex - 小角中子散射与晶体织构截面工具
#[derive(Parser)]
#[command(name = "sanstex")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Small-angle neutron scattering and texture cross-section toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding FILE / HSFBA data tables
    #[arg(long, global = true, env = "SANSTEX_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Tabulate the cross section over a wavelength range
    Xs(xs::XsArgs),

    /// Sample scattering events at a fixed wavelength
    Sample(sample::SampleArgs),

    /// List the Bragg planes used by a texture model
    Planes(planes::PlanesArgs),
}

/// 输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Csv => "csv",
        }
    }

    /// 从文件扩展名推断，默认 PNG
    pub fn guess(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("svg") => OutputFormat::Svg,
            Some("csv") => OutputFormat::Csv,
            _ => OutputFormat::Png,
        }
    }
}

/// 解析方向 "x,y,z"
pub fn parse_direction(input: &str) -> Result<[f64; 3], String> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("Invalid direction '{}', expected 'x,y,z'", input))?;

    match values.as_slice() {
        [x, y, z] if x * x + y * y + z * z > 0.0 => Ok([*x, *y, *z]),
        [_, _, _] => Err("Direction must not be the zero vector".to_string()),
        _ => Err(format!("Invalid direction '{}', expected 'x,y,z'", input)),
    }
}
