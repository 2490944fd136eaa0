//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `scatter.rs`, `report/`, `utils/`
//! - 子模块: xs, sample, planes

pub mod planes;
pub mod sample;
pub mod xs;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::models::MaterialInfo;
use crate::parsers;
use crate::scatter::{ModelSettings, ScatterModel};

use std::path::Path;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Xs(args) => xs::execute(args, &cli.data_dir),
        Commands::Sample(args) => sample::execute(args, &cli.data_dir),
        Commands::Planes(args) => planes::execute(args),
    }
}

/// 读取材料文件并构造激活的模型
fn load_model(path: &Path, settings: &ModelSettings) -> Result<(MaterialInfo, ScatterModel)> {
    let info = parsers::parse_material_file(path)?;
    let model = ScatterModel::from_material(&info, settings)?;
    Ok((info, model))
}
