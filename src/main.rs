//! # sanstex - 小角中子散射与晶体织构截面工具
//!
//! 中子散射物理模型的截面计算与散射事件抽样。
//!
//! ## 子命令
//! - `xs` - 截面随波长变化（单文件或目录批量）
//! - `sample` - 固定波长下抽样散射事件
//! - `planes` - 列出织构模型的 Bragg 晶面
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (材料文件、数值表)
//!   │     ├── scatter.rs (模型选择)
//!   │     │     ├── sans/     (SANSND、SANSISO)
//!   │     │     └── texture/  (CRYSTEXT)
//!   │     └── report/    (CSV 与绘图)
//!   ├── math/       (插值表、分布、网格、向量)
//!   ├── batch/      (批量并行)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod math;
mod models;
mod neutron;
mod parsers;
mod report;
mod sans;
mod scatter;
mod texture;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_sans_error(&e);
        std::process::exit(utils::output::exit_code(&e));
    }
}
