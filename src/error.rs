//! # 统一错误处理模块
//!
//! 定义 sanstex 的所有错误类型，使用 `thiserror` 派生。
//!
//! 两类核心错误：
//! - `BadInput`: 配置或数据不合法（构造阶段检测，查询阶段不会出现）
//! - `LogicError`: 引擎内部不变量被破坏（程序缺陷）
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// sanstex 统一错误类型
#[derive(Error, Debug)]
pub enum SansError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 模型错误
    // ─────────────────────────────────────────────────────────────
    #[error("Bad input: {0}")]
    BadInput(String),

    #[error("Logic error: {0}")]
    LogicError(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 输入不合法（配置、参数、数据文件）
    Input,
    /// 内部逻辑错误
    Logic,
    /// 输出写入失败
    Io,
    Other,
}

impl SansError {
    /// 错误归类
    pub fn kind(&self) -> ErrorKind {
        match self {
            SansError::FileReadError { .. }
            | SansError::FileNotFound { .. }
            | SansError::ParseError { .. }
            | SansError::UnsupportedFormat(_)
            | SansError::BadInput(_)
            | SansError::InvalidArgument(_)
            | SansError::InvalidRange(_) => ErrorKind::Input,
            SansError::LogicError(_) => ErrorKind::Logic,
            SansError::FileWriteError { .. } | SansError::CsvError(_) => ErrorKind::Io,
            SansError::Other(_) => ErrorKind::Other,
        }
    }

    pub fn is_bad_input(&self) -> bool {
        self.kind() == ErrorKind::Input
    }

    pub fn is_logic_error(&self) -> bool {
        self.kind() == ErrorKind::Logic
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SansError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let missing = SansError::FileNotFound {
            path: "data/none.dat".to_string(),
        };
        assert!(missing.is_bad_input());
        assert!(missing.to_string().contains("data/none.dat"));

        let logic = SansError::LogicError("cumulative weight above 1".to_string());
        assert!(logic.is_logic_error());
        assert!(!logic.is_bad_input());
    }
}
