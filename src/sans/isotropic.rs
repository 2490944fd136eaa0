//! # SANSISO 各向同性 I(Q) 模型
//!
//! `@CUSTOM_SANSISO` 段选择 I(Q) 的来源：
//! ```text
//! DirectLoad
//! Q 0.001 0.002 0.004 ...
//! I 25300 24100 20000 ...
//! ```
//! 或
//! ```text
//! HardSphere
//! radius 50          # Å
//! ```
//! 截面直接取 2π/k²·∫Q·I dQ 曲线，表外低能侧取常数、高能侧按 1/√E 外推。
//!
//! ## 依赖关系
//! - 使用 `sans/iofq.rs`、`sans/intensity.rs`
//! - 被 `scatter.rs` 使用

use crate::error::{Result, SansError};
use crate::math::Extrapolate;
use crate::models::{CustomSection, MaterialInfo, ScatteringDensity};
use crate::neutron::ScatterOutcome;
use crate::sans::intensity::{self, RadiusDistribution};
use crate::sans::iofq::IofQHelper;
use crate::sans::model::scattering_cosine;

use rand::Rng;

/// 配置段名称
pub const SANSISO_SECTION: &str = "SANSISO";

/// I(Q) 来源
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IqSource {
    DirectLoad,
    /// 半径 (Å)
    HardSphere { radius: f64 },
}

/// 各向同性 SANS 模型
#[derive(Debug, Clone)]
pub struct IsotropicSans {
    source: IqSource,
    helper: IofQHelper,
}

impl IsotropicSans {
    pub fn from_material(info: &MaterialInfo) -> Result<Self> {
        let section = info.get_custom_section(SANSISO_SECTION)?;
        match detect_source(section)? {
            IqSource::DirectLoad => Self::from_section(section, None),
            IqSource::HardSphere { .. } => {
                let density = info.scattering_density()?;
                Self::from_section(section, Some(&density))
            }
        }
    }

    /// HardSphere 需要提供散射长度密度
    pub fn from_section(
        section: &CustomSection,
        density: Option<&ScatteringDensity>,
    ) -> Result<Self> {
        let source = detect_source(section)?;
        let (q, iq) = match source {
            IqSource::DirectLoad => {
                let q = parse_row(section, "Q")?;
                let iq = parse_row(section, "I")?;
                (q, iq)
            }
            IqSource::HardSphere { radius } => {
                let density = density.ok_or_else(|| {
                    SansError::BadInput(
                        "HardSphere I(Q) requires the material scattering length density"
                            .to_string(),
                    )
                })?;
                let q = intensity::hard_sphere_grid();
                let radii = RadiusDistribution::mono(radius)?;
                let iq = intensity::hard_sphere_intensity(&q, &radii, density);
                (q, iq)
            }
        };

        let helper = IofQHelper::new(q, iq, Extrapolate::ConstOverSqrtX)?;
        Ok(Self { source, helper })
    }

    pub fn source(&self) -> IqSource {
        self.source
    }

    pub fn describe(&self) -> String {
        let (lo, hi) = self.helper.q_range();
        match self.source {
            IqSource::DirectLoad => format!("DirectLoad I(Q), Q in [{:.3e}, {:.3e}] 1/Å", lo, hi),
            IqSource::HardSphere { radius } => format!("HardSphere I(Q), radius {} Å", radius),
        }
    }

    /// 截面 (barn)
    pub fn calc_cross_section(&self, ekin: f64) -> f64 {
        self.helper.cross_section(ekin).max(0.0)
    }

    pub fn sample_scattering_event<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        ekin: f64,
    ) -> ScatterOutcome {
        let q = self.helper.sample_q(rng, ekin);
        ScatterOutcome {
            ekin_final: ekin,
            mu: scattering_cosine(q, ekin),
        }
    }
}

fn find_line<'a>(section: &'a CustomSection, keyword: &str) -> Option<&'a Vec<String>> {
    section
        .iter()
        .find(|line| line.first().map(String::as_str) == Some(keyword))
}

fn detect_source(section: &CustomSection) -> Result<IqSource> {
    if find_line(section, "DirectLoad").is_some() {
        return Ok(IqSource::DirectLoad);
    }
    if find_line(section, "HardSphere").is_some() {
        let line = find_line(section, "radius").ok_or_else(|| {
            SansError::BadInput(format!(
                "HardSphere in the @CUSTOM_{} section needs a 'radius' line",
                SANSISO_SECTION
            ))
        })?;
        if line.len() != 2 {
            return Err(SansError::BadInput(format!(
                "radius in the @CUSTOM_{} section takes exactly one value",
                SANSISO_SECTION
            )));
        }
        let radius: f64 = line[1].parse().map_err(|_| {
            SansError::BadInput(format!(
                "Invalid radius '{}' in the @CUSTOM_{} section",
                line[1], SANSISO_SECTION
            ))
        })?;
        return Ok(IqSource::HardSphere { radius });
    }
    Err(SansError::BadInput(format!(
        "The @CUSTOM_{} section must select DirectLoad or HardSphere",
        SANSISO_SECTION
    )))
}

fn parse_row(section: &CustomSection, keyword: &str) -> Result<Vec<f64>> {
    let line = find_line(section, keyword).ok_or_else(|| {
        SansError::BadInput(format!(
            "DirectLoad in the @CUSTOM_{} section needs a '{}' line",
            SANSISO_SECTION, keyword
        ))
    })?;
    line[1..]
        .iter()
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                SansError::BadInput(format!(
                    "Invalid {} value '{}' in the @CUSTOM_{} section",
                    keyword, t, SANSISO_SECTION
                ))
            })
        })
        .collect()
}
