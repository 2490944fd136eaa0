//! # 批量运行
//!
//! `xs` 子命令对目录中的材料文件逐个建模并输出截面曲线；
//! `sample` 子命令在同一线程池内按块并行抽样。
//!
//! - `collector`: 按 glob 模式收集 `.ncmat` 文件，结果按路径排序
//! - `runner`: 固定大小的 rayon 线程池，汇总成功、跳过与失败的文件
//!
//! ## 依赖关系
//! - 被 `commands/xs.rs`、`commands/sample.rs` 使用

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, ProcessResult};
