//! # 美化输出工具
//!
//! 提供统一的终端输出样式。物理计算模块本身不打印。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块与 `main.rs` 使用
//! - 使用 `colored` crate

use crate::error::{ErrorKind, SansError};

use colored::Colorize;
use std::error::Error;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印错误及其来源链，按类别附加提示
pub fn print_sans_error(err: &SansError) {
    let label = match err.kind() {
        ErrorKind::Input => "[INPUT]",
        ErrorKind::Logic => "[BUG]",
        ErrorKind::Io => "[IO]",
        ErrorKind::Other => "[ERR]",
    };
    eprintln!("{} {}", label.red().bold(), err);

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }

    if err.kind() == ErrorKind::Logic {
        eprintln!(
            "  {}",
            "internal consistency check failed; please report this with the input file".dimmed()
        );
    }
}

/// 进程退出码：输入错误 2，内部错误 70，其余 1
pub fn exit_code(err: &SansError) -> i32 {
    match err.kind() {
        ErrorKind::Input => 2,
        ErrorKind::Logic => 70,
        ErrorKind::Io | ErrorKind::Other => 1,
    }
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
