//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理的材料文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式）
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/xs.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{Result, SansError};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec!["*".to_string()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec!["*".to_string()];
        }
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }
        if !self.input.is_dir() {
            return Ok(vec![]);
        }

        let patterns = self
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| SansError::InvalidArgument(format!("pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| matches_any(&patterns, e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();

        Ok(files)
    }
}

/// 文件名是否匹配任一模式
fn matches_any(patterns: &[Pattern], path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| patterns.iter().any(|p| p.matches(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_pattern_matching() {
        let patterns = vec![Pattern::new("*.ncmat").unwrap(), Pattern::new("Al?.txt").unwrap()];
        assert!(matches_any(&patterns, Path::new("dir/Al_sg225.ncmat")));
        assert!(matches_any(&patterns, Path::new("Al1.txt")));
        assert!(!matches_any(&patterns, Path::new("Al12.txt")));
        assert!(!matches_any(&patterns, Path::new("notes.md")));
    }

    #[test]
    fn test_collect_directory() {
        let dir = std::env::temp_dir().join("sanstex_collector_test");
        let nested = dir.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("b.ncmat"), "NCMAT v7\n").unwrap();
        fs::write(dir.join("a.ncmat"), "NCMAT v7\n").unwrap();
        fs::write(dir.join("readme.txt"), "").unwrap();
        fs::write(nested.join("c.ncmat"), "NCMAT v7\n").unwrap();

        let flat = FileCollector::new(dir.clone())
            .with_pattern("*.ncmat")
            .collect()
            .unwrap();
        assert_eq!(flat, vec![dir.join("a.ncmat"), dir.join("b.ncmat")]);

        let deep = FileCollector::new(dir.clone())
            .with_pattern("*.ncmat")
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(deep.len(), 3);

        assert!(FileCollector::new(dir.clone())
            .with_pattern("[")
            .collect()
            .is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
