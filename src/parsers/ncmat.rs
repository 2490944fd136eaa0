//! # NCMAT 材料文件解析器
//!
//! ## 格式说明
//! ```text
//! NCMAT v7
//! # comment
//! @CELL
//!   lengths 4.04958 4.04958 4.04958
//!   angles 90 90 90
//! @ATOMPOSITIONS
//!   Al 0 0 0
//!   Al 0 1/2 1/2
//! @DENSITY
//!   0.0602 atoms_per_aa3
//! @CUSTOM_SANSND
//!   2.0
//!   PPF
//!   132.869 1.33605 0.0519763 3.97314 0.0510821 1
//! ```
//! 未识别的段（@SPACEGROUP、@DYNINFO 等）被忽略；`@CUSTOM_<NAME>` 段按行保存 token。
//!
//! ## 依赖关系
//! - 被 `scatter.rs` 与 `commands/` 使用
//! - 构造 `models/material.rs` 的 MaterialInfo

use crate::error::{Result, SansError};
use crate::models::{Atom, Crystal, Lattice, MaterialInfo};

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*NCMAT\s+v(\d+)\b").expect("valid regex"));

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9_]*)\s*$").expect("valid regex"));

/// 解析 NCMAT 文件
pub fn parse_ncmat_file(path: &Path) -> Result<MaterialInfo> {
    if !path.is_file() {
        return Err(SansError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| SansError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    parse_ncmat_content(&content, name)
}

/// 从字符串内容解析 NCMAT
pub fn parse_ncmat_content(content: &str, name: &str) -> Result<MaterialInfo> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, raw)| (i + 1, raw.split('#').next().unwrap_or("").trim()))
        .filter(|(_, l)| !l.is_empty());

    match lines.next() {
        Some((_, first)) if HEADER_RE.is_match(first) => {}
        _ => return Err(ncmat_error(name, 1, "missing 'NCMAT vN' header")),
    }

    let mut info = MaterialInfo::new(name);
    let mut cell = CellBuilder::default();
    let mut atoms: Vec<Atom> = Vec::new();
    let mut sections: Vec<RawSection> = Vec::new();

    for (lineno, line) in lines {
        if let Some(caps) = SECTION_RE.captures(line) {
            sections.push(RawSection {
                name: caps[1].to_string(),
                lines: Vec::new(),
            });
            continue;
        }
        match sections.last_mut() {
            Some(section) => section
                .lines
                .push((lineno, line.split_whitespace().map(String::from).collect())),
            None => return Err(ncmat_error(name, lineno, "data outside of any @SECTION")),
        }
    }

    for section in sections {
        if let Some(custom) = section.name.strip_prefix("CUSTOM_") {
            let body = section.lines.into_iter().map(|(_, tokens)| tokens).collect();
            info.add_custom_section(custom, body);
            continue;
        }
        match section.name.as_str() {
            "CELL" => cell.read(&section.lines, name)?,
            "ATOMPOSITIONS" => {
                for (lineno, tokens) in &section.lines {
                    atoms.push(parse_atom(tokens, name, *lineno)?);
                }
            }
            "DENSITY" => info.density = Some(parse_density(&section.lines, name)?),
            _ => {}
        }
    }

    match (cell.build(name)?, atoms.is_empty()) {
        (Some(lattice), _) => info.crystal = Some(Crystal::new(name, lattice, atoms)),
        (None, false) => {
            return Err(ncmat_error(name, 0, "@ATOMPOSITIONS given without @CELL"));
        }
        (None, true) => {}
    }

    Ok(info)
}

/// 带行号的段内容
struct RawSection {
    name: String,
    lines: Vec<(usize, Vec<String>)>,
}

#[derive(Debug, Default)]
struct CellBuilder {
    lengths: Option<[f64; 3]>,
    angles: Option<[f64; 3]>,
}

impl CellBuilder {
    fn read(&mut self, lines: &[(usize, Vec<String>)], name: &str) -> Result<()> {
        for (lineno, tokens) in lines {
            let lineno = *lineno;
            let values = tokens[1..]
                .iter()
                .map(|t| parse_number(t, name, lineno))
                .collect::<Result<Vec<f64>>>()?;
            let triple = match values.as_slice() {
                [a] => [*a, *a, *a],
                [a, b, c] => [*a, *b, *c],
                _ => return Err(ncmat_error(name, lineno, "expected one or three values")),
            };
            match tokens[0].as_str() {
                "lengths" => self.lengths = Some(triple),
                "angles" => self.angles = Some(triple),
                "cubic" => {
                    self.lengths = Some(triple);
                    self.angles = Some([90.0; 3]);
                }
                other => {
                    return Err(ncmat_error(
                        name,
                        lineno,
                        &format!("unknown @CELL keyword '{}'", other),
                    ))
                }
            }
        }
        Ok(())
    }

    fn build(&self, name: &str) -> Result<Option<Lattice>> {
        match (self.lengths, self.angles) {
            (None, None) => Ok(None),
            (Some([a, b, c]), Some([alpha, beta, gamma])) => {
                if a <= 0.0 || b <= 0.0 || c <= 0.0 {
                    return Err(ncmat_error(name, 0, "@CELL lengths must be positive"));
                }
                Ok(Some(Lattice::from_parameters(a, b, c, alpha, beta, gamma)))
            }
            _ => Err(ncmat_error(name, 0, "@CELL needs both lengths and angles")),
        }
    }
}

fn parse_atom(tokens: &[String], name: &str, lineno: usize) -> Result<Atom> {
    if tokens.len() != 4 {
        return Err(ncmat_error(name, lineno, "atom line must be 'Element x y z'"));
    }
    let mut position = [0.0; 3];
    for (p, t) in position.iter_mut().zip(&tokens[1..]) {
        *p = parse_number(t, name, lineno)?;
    }
    Ok(Atom::new(tokens[0].clone(), position))
}

fn parse_density(lines: &[(usize, Vec<String>)], name: &str) -> Result<f64> {
    let [(lineno, tokens)] = lines else {
        return Err(ncmat_error(name, 0, "@DENSITY takes exactly one line"));
    };
    let lineno = *lineno;
    match tokens.as_slice() {
        [value, unit] if unit == "atoms_per_aa3" => {
            let density = parse_number(value, name, lineno)?;
            if !(density > 0.0) {
                return Err(ncmat_error(name, lineno, "density must be positive"));
            }
            Ok(density)
        }
        [_, unit] => Err(SansError::UnsupportedFormat(format!(
            "@DENSITY unit '{}' in '{}' (only atoms_per_aa3 is supported)",
            unit, name
        ))),
        _ => Err(ncmat_error(name, lineno, "expected '<value> <unit>'")),
    }
}

/// 数值，允许 `1/2` 形式的分数
fn parse_number(token: &str, name: &str, lineno: usize) -> Result<f64> {
    let value = match token.split_once('/') {
        Some((num, den)) => match (num.parse::<f64>(), den.parse::<f64>()) {
            (Ok(n), Ok(d)) if d != 0.0 => Some(n / d),
            _ => None,
        },
        None => token.parse::<f64>().ok(),
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| ncmat_error(name, lineno, &format!("invalid number '{}'", token)))
}

fn ncmat_error(name: &str, lineno: usize, reason: &str) -> SansError {
    SansError::ParseError {
        format: "ncmat".to_string(),
        path: name.to_string(),
        reason: if lineno > 0 {
            format!("line {}: {}", lineno, reason)
        } else {
            reason.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALUMINIUM: &str = "NCMAT v7
# fcc aluminium
@CELL
  lengths 4.04958 4.04958 4.04958
  angles 90 90 90
@SPACEGROUP
  225
@ATOMPOSITIONS
  Al 0 0 0
  Al 0 1/2 1/2
  Al 1/2 0 1/2
  Al 1/2 1/2 0
@CUSTOM_CRYSTEXT
  1 0 0 0.8 0.5   # first
  0 1 0 0.8 0.5
";

    #[test]
    fn test_parse_aluminium() {
        let info = parse_ncmat_content(ALUMINIUM, "Al").unwrap();
        let crystal = info.crystal().unwrap();
        assert_eq!(crystal.atoms.len(), 4);
        assert_eq!(crystal.atoms[1].position, [0.0, 0.5, 0.5]);
        assert!((crystal.lattice.volume() - 4.04958f64.powi(3)).abs() < 1e-9);
        assert_eq!(info.density, None);

        assert_eq!(info.count_custom_sections("CRYSTEXT"), 1);
        let section = info.get_custom_section("CRYSTEXT").unwrap();
        assert_eq!(section.len(), 2);
        assert_eq!(section[0], vec!["1", "0", "0", "0.8", "0.5"]);
    }

    #[test]
    fn test_density_and_cubic_shorthand() {
        let content = "NCMAT v5\n@CELL\n cubic 3.567\n@ATOMPOSITIONS\n C 0 0 0\n@DENSITY\n 0.1771 atoms_per_aa3\n";
        let info = parse_ncmat_content(content, "C").unwrap();
        assert_eq!(info.density, Some(0.1771));
        assert_eq!(info.number_density(), Some(0.1771));
        let (a, b, c, alpha, _, _) = info.crystal().unwrap().lattice.parameters();
        assert!((a - 3.567).abs() < 1e-12 && (b - a).abs() < 1e-12 && (c - a).abs() < 1e-12);
        assert!((alpha - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_custom_sections_kept() {
        let content = "NCMAT v7\n@CUSTOM_SANSND\n 2.0\n@CUSTOM_SANSND\n 2.0\n";
        let info = parse_ncmat_content(content, "x").unwrap();
        assert_eq!(info.count_custom_sections("SANSND"), 2);
        assert!(info.get_custom_section("SANSND").unwrap_err().is_bad_input());
        assert!(info.crystal.is_none());
    }

    #[test]
    fn test_errors() {
        assert!(parse_ncmat_content("@CELL\n", "x").is_err());
        assert!(parse_ncmat_content("NCMAT v7\n1 2 3\n", "x").is_err());
        assert!(parse_ncmat_content("NCMAT v7\n@CELL\n lengths 1 2\n", "x").is_err());
        assert!(parse_ncmat_content("NCMAT v7\n@CELL\n lengths 1 1 1\n", "x").is_err());
        assert!(parse_ncmat_content("NCMAT v7\n@ATOMPOSITIONS\n Al 0 0 0\n", "x").is_err());
        assert!(parse_ncmat_content("NCMAT v7\n@DENSITY\n 2.7 g_per_cm3\n", "x").is_err());
        let err = parse_ncmat_file(Path::new("/nonexistent/file.ncmat")).unwrap_err();
        assert!(matches!(err, SansError::FileNotFound { .. }));
    }
}
