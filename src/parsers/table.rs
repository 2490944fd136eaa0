//! # 两列数值表解析器
//!
//! 读取 (Q, I) 或 (半径, 频率) 形式的数据文件：
//! ```text
//! # comment
//! 1.0e-3   2.53e4
//! 1.2e-3   2.41e4
//! ```
//! 每行两个空白分隔的数值，`#` 之后为注释，空行忽略；多余的列忽略。
//!
//! ## 依赖关系
//! - 被 `sans/model.rs` 用于 FILE 与 HSFBA 分布文件

use crate::error::{Result, SansError};
use std::fs;
use std::path::Path;

/// 两列数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwoColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl TwoColumns {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// 读取两列数据文件
pub fn parse_two_column_file(path: &Path) -> Result<TwoColumns> {
    if !path.is_file() {
        return Err(SansError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| SansError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_two_column_content(&content, &path.display().to_string())
}

/// 从字符串解析两列数据
pub fn parse_two_column_content(content: &str, source: &str) -> Result<TwoColumns> {
    let mut table = TwoColumns::default();

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(a), Some(b)) = (parts.next(), parts.next()) else {
            return Err(table_error(source, lineno, "expected two columns"));
        };
        let x: f64 = a
            .parse()
            .map_err(|_| table_error(source, lineno, &format!("invalid number '{}'", a)))?;
        let y: f64 = b
            .parse()
            .map_err(|_| table_error(source, lineno, &format!("invalid number '{}'", b)))?;

        table.x.push(x);
        table.y.push(y);
    }

    if table.is_empty() {
        return Err(SansError::ParseError {
            format: "two-column table".to_string(),
            path: source.to_string(),
            reason: "no data lines".to_string(),
        });
    }

    Ok(table)
}

fn table_error(source: &str, lineno: usize, reason: &str) -> SansError {
    SansError::ParseError {
        format: "two-column table".to_string(),
        path: source.to_string(),
        reason: format!("line {}: {}", lineno + 1, reason),
    }
}
