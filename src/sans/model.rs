//! # SANSND 稀释各向同性 SANS 模型
//!
//! 四种模型变体，每种只携带自身需要的数据：
//!
//! | 变体 | 截面 | Q 抽样 |
//! |------|------|--------|
//! | FileLoaded | ∫Q·I dQ / (2k²) | I(Q) 逆累积 |
//! | PiecewisePowerLaw | 闭式解 | 闭式逆累积 |
//! | GuinierPorod | ∫Q·I dQ / (2k²) | I(Q) 逆累积 |
//! | HardSphere | 2π/k²·∫Q·I dQ | I(Q) 逆累积 |
//!
//! 所有散射均为弹性：E_final = E，μ = 1 - Q²/(2k²)。
//! 数值误差导致的负截面按 0 处理。
//!
//! ## 依赖关系
//! - 使用 `sans/params.rs` 解析配置
//! - 使用 `sans/iofq.rs`、`sans/intensity.rs`、`sans/ppf.rs`
//! - 使用 `parsers/table.rs` 读取数据文件
//! - 被 `scatter.rs` 使用

use crate::error::Result;
use crate::math::Extrapolate;
use crate::models::{CustomSection, MaterialInfo, ScatteringDensity};
use crate::neutron::{ekin2ksq, ScatterOutcome};
use crate::parsers::table::parse_two_column_file;
use crate::sans::intensity::{self, RadiusDistribution};
use crate::sans::iofq::IofQHelper;
use crate::sans::params::{GpfParams, ModelParams, ModelSelector, PpfParams, RadiusSpec};

use rand::Rng;
use std::path::Path;

/// 配置段名称
pub const SANSND_SECTION: &str = "SANSND";

/// 低于此 k² (Å⁻²) 视为静止中子
const KSQ_TINY: f64 = 1e-20;

/// 文件半径单位 nm -> Å
const NM_TO_AA: f64 = 10.0;

/// SANSND 模型
#[derive(Debug, Clone)]
pub enum SansModel {
    FileLoaded {
        helper: IofQHelper,
    },
    PiecewisePowerLaw {
        params: PpfParams,
    },
    GuinierPorod {
        params: GpfParams,
        helper: IofQHelper,
    },
    HardSphere {
        radii: RadiusDistribution,
        helper: IofQHelper,
    },
}

impl SansModel {
    /// 从材料的 @CUSTOM_SANSND 段构造
    pub fn from_material(info: &MaterialInfo, data_dir: &Path) -> Result<Self> {
        let section = info.get_custom_section(SANSND_SECTION)?;
        let density = match info.crystal {
            Some(_) => info.scattering_density()?,
            None => ScatteringDensity::diamond(),
        };
        Self::from_section(section, data_dir, &density)
    }

    pub fn from_section(
        section: &CustomSection,
        data_dir: &Path,
        density: &ScatteringDensity,
    ) -> Result<Self> {
        Self::build(ModelParams::parse(section, data_dir)?, density)
    }

    /// 由已校验参数构造，需要的表格在此一次性生成
    pub fn build(params: ModelParams, density: &ScatteringDensity) -> Result<Self> {
        match params {
            ModelParams::File(path) => {
                let table = parse_two_column_file(&path)?;
                let helper = IofQHelper::new(table.x, table.y, Extrapolate::ZeroZero)?;
                Ok(SansModel::FileLoaded { helper })
            }
            ModelParams::Ppf(params) => {
                params.validate()?;
                Ok(SansModel::PiecewisePowerLaw { params })
            }
            ModelParams::Gpf(params) => {
                let (q, iq) = intensity::guinier_porod(&params)?;
                let helper = IofQHelper::new(q, iq, Extrapolate::ZeroZero)?;
                Ok(SansModel::GuinierPorod { params, helper })
            }
            ModelParams::HardSphere(spec) => {
                let radii = match spec {
                    RadiusSpec::Mono(r_nm) => RadiusDistribution::mono(r_nm * NM_TO_AA)?,
                    RadiusSpec::Distribution(path) => {
                        let table = parse_two_column_file(&path)?;
                        let radii = table.x.iter().map(|r| r * NM_TO_AA).collect();
                        RadiusDistribution::new(radii, table.y)?
                    }
                };
                let q = intensity::hard_sphere_grid();
                let iq = intensity::hard_sphere_intensity(&q, &radii, density);
                let helper = IofQHelper::new(q, iq, Extrapolate::ZeroZero)?;
                Ok(SansModel::HardSphere { radii, helper })
            }
        }
    }

    pub fn selector(&self) -> ModelSelector {
        match self {
            SansModel::FileLoaded { .. } => ModelSelector::File,
            SansModel::PiecewisePowerLaw { .. } => ModelSelector::Ppf,
            SansModel::GuinierPorod { .. } => ModelSelector::Gpf,
            SansModel::HardSphere { .. } => ModelSelector::Hsfba,
        }
    }

    /// 一行模型概要
    pub fn describe(&self) -> String {
        match self {
            SansModel::FileLoaded { helper } => {
                let (lo, hi) = helper.q_range();
                format!("{}: tabulated I(Q), Q in [{:.3e}, {:.3e}] 1/Å", self.selector(), lo, hi)
            }
            SansModel::PiecewisePowerLaw { params } => format!(
                "{}: Q^-{} below Q0 = {} 1/Å, Q^-{} above, correction {}",
                self.selector(),
                params.b1,
                params.q0,
                params.b2,
                params.correction
            ),
            SansModel::GuinierPorod { params, .. } => format!(
                "{}: Rg = {} Å, s = {}, m = {}, Q1 = {}, Q2 = {:.4e} 1/Å",
                self.selector(),
                params.rg,
                params.s,
                params.m,
                params.q1,
                params.q2()
            ),
            SansModel::HardSphere { radii, .. } => format!(
                "{}: {} radii, mean radius {:.2} Å",
                self.selector(),
                radii.len(),
                radii.mean_radius()
            ),
        }
    }

    /// 总截面 (barn)，不小于 0
    pub fn calc_cross_section(&self, ekin: f64) -> f64 {
        let xs = match self {
            SansModel::PiecewisePowerLaw { params } => params.cross_section(ekin),
            SansModel::FileLoaded { helper } | SansModel::GuinierPorod { helper, .. } => {
                let ksq = ekin2ksq(ekin);
                if ksq > KSQ_TINY {
                    helper.qiofq_integral(ekin) / (2.0 * ksq)
                } else {
                    0.0
                }
            }
            SansModel::HardSphere { helper, .. } => helper.cross_section(ekin),
        };
        if xs.is_nan() {
            0.0
        } else {
            xs.max(0.0)
        }
    }

    /// 抽样动量转移 Q (Å⁻¹)，保证 Q ≤ 2k
    pub fn sample_scattering_vector<R: Rng + ?Sized>(&self, rng: &mut R, ekin: f64) -> f64 {
        match self {
            SansModel::PiecewisePowerLaw { params } => params.sample_q(rng, ekin),
            SansModel::FileLoaded { helper }
            | SansModel::GuinierPorod { helper, .. }
            | SansModel::HardSphere { helper, .. } => helper.sample_q(rng, ekin),
        }
    }

    /// 弹性散射事件
    pub fn sample_scattering_event<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        ekin: f64,
    ) -> ScatterOutcome {
        let q = self.sample_scattering_vector(rng, ekin);
        ScatterOutcome {
            ekin_final: ekin,
            mu: scattering_cosine(q, ekin),
        }
    }
}

/// μ = 1 - Q²/(2k²)，限制在 [-1, 1]；k² 近 0 时返回 1
pub fn scattering_cosine(q: f64, ekin: f64) -> f64 {
    let ksq = ekin2ksq(ekin);
    if !(ksq > KSQ_TINY) {
        return 1.0;
    }
    (1.0 - 0.5 * q * q / ksq).clamp(-1.0, 1.0)
}
