//! # SANSND 配置解析
//!
//! 解析 `@CUSTOM_SANSND` 段：
//! ```text
//! 2.0                       # 版本号，必须为 2.0
//! PPF                       # FILE | PPF | GPF | HSFBA 或 0-3
//! 132.869 1.33605 ...       # 模型参数
//! ```
//!
//! 所有校验都在这里完成，构造出的参数在查询阶段不会再报错。
//!
//! ## 依赖关系
//! - 被 `sans/model.rs` 使用
//! - 使用 `sans/intensity.rs` 的网格上限校验 GPF 边界

use crate::error::{Result, SansError};
use crate::sans::intensity::q_grid_max;

use std::fmt;
use std::path::{Path, PathBuf};

/// 唯一支持的配置版本
pub const SUPPORTED_VERSION: f64 = 2.0;

/// GPF 未给出 Q1 时的默认值 (Å⁻¹)
pub const DEFAULT_GPF_Q1: f64 = 0.016;

const SECTION: &str = "SANSND";

/// 模型选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelector {
    File,
    Ppf,
    Gpf,
    Hsfba,
}

impl ModelSelector {
    /// 解析名称或数字编号
    pub fn parse(token: &str) -> Result<Self> {
        match token.to_ascii_uppercase().as_str() {
            "FILE" | "0" => Ok(ModelSelector::File),
            "PPF" | "1" => Ok(ModelSelector::Ppf),
            "GPF" | "2" => Ok(ModelSelector::Gpf),
            "HSFBA" | "3" => Ok(ModelSelector::Hsfba),
            _ => Err(SansError::BadInput(format!(
                "Invalid model '{}' in the @CUSTOM_{} section (expected FILE, PPF, GPF or HSFBA)",
                token, SECTION
            ))),
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelSelector::File => "FILE",
            ModelSelector::Ppf => "PPF",
            ModelSelector::Gpf => "GPF",
            ModelSelector::Hsfba => "HSFBA",
        };
        write!(f, "{}", name)
    }
}

/// 分段幂律拟合参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PpfParams {
    pub a1: f64,
    pub b1: f64,
    pub a2: f64,
    pub b2: f64,
    /// 两段分界 (Å⁻¹)
    pub q0: f64,
    /// 截面整体修正因子
    pub correction: f64,
}

/// Guinier-Porod 拟合参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpfParams {
    pub a: f64,
    /// 维度参数
    pub s: f64,
    /// 回转半径 (Å)
    pub rg: f64,
    /// Porod 指数
    pub m: f64,
    /// 低 Q 幂律指数
    pub p: f64,
    /// Q 网格起点 (Å⁻¹)
    pub q_min: f64,
    /// 低 Q 幂律与 Guinier 区分界
    pub q1: f64,
}

/// 硬球半径来源
#[derive(Debug, Clone, PartialEq)]
pub enum RadiusSpec {
    /// 单分散半径 (nm)
    Mono(f64),
    /// 两列 (半径 nm, 频率) 分布文件
    Distribution(PathBuf),
}

/// 已校验的模型参数
#[derive(Debug, Clone, PartialEq)]
pub enum ModelParams {
    File(PathBuf),
    Ppf(PpfParams),
    Gpf(GpfParams),
    HardSphere(RadiusSpec),
}

impl ModelParams {
    pub fn selector(&self) -> ModelSelector {
        match self {
            ModelParams::File(_) => ModelSelector::File,
            ModelParams::Ppf(_) => ModelSelector::Ppf,
            ModelParams::Gpf(_) => ModelSelector::Gpf,
            ModelParams::HardSphere(_) => ModelSelector::Hsfba,
        }
    }

    /// 解析整个配置段，数据文件相对 `data_dir` 查找
    pub fn parse(section: &[Vec<String>], data_dir: &Path) -> Result<Self> {
        if section.len() != 3 {
            return Err(SansError::BadInput(format!(
                "The @CUSTOM_{} section must have exactly three lines (version, model, parameters), found {}",
                SECTION,
                section.len()
            )));
        }
        if section[0].len() != 1 || section[1].len() != 1 {
            return Err(SansError::BadInput(format!(
                "Version and model lines of the @CUSTOM_{} section take exactly one value",
                SECTION
            )));
        }

        let version = parse_number(&section[0][0], "version")?;
        if version != SUPPORTED_VERSION {
            return Err(SansError::BadInput(format!(
                "Invalid version {} specified for the {} model. Only version {:.1} is supported.",
                section[0][0], SECTION, SUPPORTED_VERSION
            )));
        }

        let selector = ModelSelector::parse(&section[1][0])?;
        let tokens = &section[2];

        match selector {
            ModelSelector::File => {
                expect_count(tokens, &[1], selector)?;
                Ok(ModelParams::File(resolve_data_file(data_dir, &tokens[0])?))
            }
            ModelSelector::Ppf => {
                expect_count(tokens, &[5, 6], selector)?;
                let v = parse_all(tokens)?;
                let params = PpfParams {
                    a1: v[0],
                    b1: v[1],
                    a2: v[2],
                    b2: v[3],
                    q0: v[4],
                    correction: v.get(5).copied().unwrap_or(1.0),
                };
                params.validate()?;
                Ok(ModelParams::Ppf(params))
            }
            ModelSelector::Gpf => {
                expect_count(tokens, &[6, 7], selector)?;
                let v = parse_all(tokens)?;
                let params = GpfParams {
                    a: v[0],
                    s: v[1],
                    rg: v[2],
                    m: v[3],
                    p: v[4],
                    q_min: v[5],
                    q1: v.get(6).copied().unwrap_or(DEFAULT_GPF_Q1),
                };
                params.validate()?;
                Ok(ModelParams::Gpf(params))
            }
            ModelSelector::Hsfba => {
                expect_count(tokens, &[1], selector)?;
                match tokens[0].parse::<f64>() {
                    Ok(radius) => {
                        if !(radius > 0.0) || !radius.is_finite() {
                            return Err(SansError::BadInput(format!(
                                "Hard sphere radius must be positive, got {}",
                                radius
                            )));
                        }
                        Ok(ModelParams::HardSphere(RadiusSpec::Mono(radius)))
                    }
                    Err(_) => Ok(ModelParams::HardSphere(RadiusSpec::Distribution(
                        resolve_data_file(data_dir, &tokens[0])?,
                    ))),
                }
            }
        }
    }
}

impl PpfParams {
    pub fn validate(&self) -> Result<()> {
        let all = [self.a1, self.b1, self.a2, self.b2, self.q0, self.correction];
        if all.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(SansError::BadInput(format!(
                "PPF parameters must all be strictly positive: {:?}",
                all
            )));
        }
        if self.b1 >= 2.0 {
            return Err(SansError::BadInput(format!(
                "PPF exponent b1 must be below 2 for a finite low-Q integral, got {}",
                self.b1
            )));
        }
        if self.b2 == 2.0 {
            return Err(SansError::BadInput(
                "PPF exponent b2 must not equal 2".to_string(),
            ));
        }
        Ok(())
    }
}

impl GpfParams {
    /// Guinier 区与 Porod 区分界
    pub fn q2(&self) -> f64 {
        ((self.m - self.s) * (3.0 - self.s) / 2.0).sqrt() / self.rg
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [self.a, self.rg, self.m, self.p, self.q_min, self.q1];
        if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) || !self.s.is_finite() {
            return Err(SansError::BadInput(format!(
                "GPF parameters A, rg, m, p, Qmin and Q1 must be strictly positive: {:?}",
                self
            )));
        }
        if self.s < 0.0 {
            return Err(SansError::BadInput(format!(
                "GPF dimension parameter s must not be negative, got {}",
                self.s
            )));
        }
        if self.s == 3.0 {
            return Err(SansError::BadInput(
                "GPF dimension parameter s must not equal 3".to_string(),
            ));
        }
        if !((self.m - self.s) * (3.0 - self.s) > 0.0) {
            return Err(SansError::BadInput(format!(
                "GPF parameters give no Guinier-Porod crossover ((m-s)(3-s) = {})",
                (self.m - self.s) * (3.0 - self.s)
            )));
        }

        let q2 = self.q2();
        let grid_max = q_grid_max();
        if self.q1 <= self.q_min || self.q1 >= grid_max {
            return Err(SansError::BadInput(format!(
                "GPF Q1 = {} lies outside the Q grid [{}, {}]",
                self.q1, self.q_min, grid_max
            )));
        }
        if q2 >= grid_max {
            return Err(SansError::BadInput(format!(
                "GPF Q2 = {} lies outside the Q grid [{}, {}]",
                q2, self.q_min, grid_max
            )));
        }
        if self.q1 >= q2 {
            return Err(SansError::BadInput(format!(
                "GPF requires Q1 < Q2, got Q1 = {} and Q2 = {}",
                self.q1, q2
            )));
        }
        Ok(())
    }
}

fn parse_number(token: &str, what: &str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| {
        SansError::BadInput(format!(
            "Invalid {} value '{}' in the @CUSTOM_{} section",
            what, token, SECTION
        ))
    })
}

fn parse_all(tokens: &[String]) -> Result<Vec<f64>> {
    tokens.iter().map(|t| parse_number(t, "parameter")).collect()
}

fn expect_count(tokens: &[String], allowed: &[usize], selector: ModelSelector) -> Result<()> {
    if allowed.contains(&tokens.len()) {
        return Ok(());
    }
    Err(SansError::BadInput(format!(
        "Model {} in the @CUSTOM_{} section takes {:?} parameters, found {}",
        selector,
        SECTION,
        allowed,
        tokens.len()
    )))
}

/// 数据文件位于 data_dir 下，必须存在
pub fn resolve_data_file(data_dir: &Path, name: &str) -> Result<PathBuf> {
    let path = data_dir.join(name);
    if !path.is_file() {
        return Err(SansError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(lines: &[&str]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.split_whitespace().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_parse_ppf() {
        let s = section(&["2.0", "PPF", "132.869 1.33605 0.0519763 3.97314 0.0510821 1"]);
        let p = ModelParams::parse(&s, Path::new("data")).unwrap();
        match p {
            ModelParams::Ppf(pp) => {
                assert_eq!(pp.a1, 132.869);
                assert_eq!(pp.q0, 0.0510821);
                assert_eq!(pp.correction, 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_legacy_ppf_and_numeric_selector() {
        let s = section(&["2", "1", "132.869 1.33605 0.0519763 3.97314 0.0510821"]);
        let p = ModelParams::parse(&s, Path::new("data")).unwrap();
        assert_eq!(p.selector(), ModelSelector::Ppf);
    }

    #[test]
    fn test_version_mismatch() {
        let s = section(&["1.0", "PPF", "1 1 1 3 0.05 1"]);
        let err = ModelParams::parse(&s, Path::new("data")).unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_ppf_rejects_non_positive() {
        let s = section(&["2.0", "PPF", "1 -1 1 3 0.05 1"]);
        assert!(ModelParams::parse(&s, Path::new("data")).is_err());
        let s = section(&["2.0", "PPF", "1 1 1 3 0.0"]);
        assert!(ModelParams::parse(&s, Path::new("data")).is_err());
    }

    #[test]
    fn test_gpf_default_q1() {
        let s = section(&["2.0", "GPF", "1e-3 0.5 50 4 1.5 1e-5"]);
        match ModelParams::parse(&s, Path::new("data")).unwrap() {
            ModelParams::Gpf(g) => assert_eq!(g.q1, DEFAULT_GPF_Q1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_gpf_q1_not_below_q2() {
        // rg = 500 Å: Q2 = sqrt(3.5·2.5/2)/500 ≈ 0.0042 < Q1 = 0.016
        let s = section(&["2.0", "GPF", "1e-3 0.5 500 4 1.5 1e-5"]);
        let err = ModelParams::parse(&s, Path::new("data")).unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("Q1 < Q2"));
    }

    #[test]
    fn test_gpf_s_equal_three() {
        let s = section(&["2.0", "GPF", "1e-3 3 50 4 1.5 1e-5"]);
        assert!(ModelParams::parse(&s, Path::new("data")).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = std::env::temp_dir().join("sanstex_params_missing");
        let s = section(&["2.0", "FILE", "no_such_curve.dat"]);
        let err = ModelParams::parse(&s, &dir).unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("no_such_curve.dat"));
    }

    #[test]
    fn test_hsfba_mono_and_file() {
        let s = section(&["2.0", "HSFBA", "2.5"]);
        assert_eq!(
            ModelParams::parse(&s, Path::new("data")).unwrap(),
            ModelParams::HardSphere(RadiusSpec::Mono(2.5))
        );
        let s = section(&["2.0", "HSFBA", "radii.dat"]);
        assert!(ModelParams::parse(&s, Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_bad_layout() {
        assert!(ModelParams::parse(&section(&["2.0", "PPF"]), Path::new("data")).is_err());
        assert!(ModelParams::parse(&section(&["2.0", "XYZ", "1"]), Path::new("data")).is_err());
        assert!(
            ModelParams::parse(&section(&["2.0 1", "PPF", "1 1 1 3 0.05"]), Path::new("data"))
                .is_err()
        );
    }
}
