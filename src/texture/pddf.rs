//! # 极密度分布函数 (PDDF)
//!
//! March-Dollase 纤维织构：择优方向 H 与织构轴 A 的夹角分布
//! ```text
//! P(α) = (R²·cos²α + sin²α / R)^(-3/2)
//! ```
//! R = 1 为无织构，R < 1 为片状择优，R > 1 为针状择优。P 在球面上的平均为 1。
//!
//! 晶面法向与 H 夹角为 β 时，该晶面的极密度需对绕 A 的转角 ψ 取平均：
//! ```text
//! P_hkl(α) = <P(ψ')>_ψ,   cos ψ' = cos α·cos β + sin α·sin β·cos ψ
//! ```
//! P_hkl 只依赖 |cos α|，构造时在 [0, 1] 上制表。
//!
//! ## 依赖关系
//! - 被 `texture/model.rs` 使用
//! - 使用 `math/lookup.rs`

use crate::error::{Result, SansError};
use crate::math::grid::linspace;
use crate::math::vector::{normalize, Vec3};
use crate::math::{Extrapolate, LookUpTable};

use std::f64::consts::PI;

/// 周期梯形积分的分段数
pub const SPIN_STEPS: usize = 72;

/// P_hkl 表格点数
pub const POLE_TABLE_POINTS: usize = 513;

/// sin β 低于此值视为晶面法向与择优方向平行
const ALIGNED_SIN_LIMIT: f64 = 1e-9;

/// March-Dollase 极密度
pub fn march_dollase(r: f64, cos_alpha: f64) -> f64 {
    let c2 = (cos_alpha * cos_alpha).min(1.0);
    (r * r * c2 + (1.0 - c2) / r).powf(-1.5)
}

/// 等分 [0, 2π) 的 (cos, sin) 表
pub fn periodic_nodes(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|j| {
            let (s, c) = (2.0 * PI * j as f64 / n as f64).sin_cos();
            (c, s)
        })
        .collect()
}

/// 织构分量：择优方向（晶体系单位向量）、March-Dollase 系数、体积分数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureComponent {
    pub direction: Vec3,
    pub sharpness: f64,
    pub fraction: f64,
}

impl TextureComponent {
    pub fn new(direction: Vec3, sharpness: f64, fraction: f64) -> Result<Self> {
        let direction = normalize(&direction).ok_or_else(|| {
            SansError::BadInput("Preferred orientation must not be [0,0,0]".to_string())
        })?;
        if !(sharpness > 0.0) || !sharpness.is_finite() {
            return Err(SansError::BadInput(format!(
                "March-Dollase coefficient must be positive, got {}",
                sharpness
            )));
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Err(SansError::BadInput(format!(
                "Texture fraction must lie in [0, 1], got {}",
                fraction
            )));
        }
        Ok(Self {
            direction,
            sharpness,
            fraction,
        })
    }
}

/// 单个晶面相对单个织构分量的极密度
#[derive(Debug, Clone)]
pub enum PoleDensity {
    /// R = 1
    Isotropic,
    /// 晶面法向平行于择优方向
    Aligned { sharpness: f64 },
    /// 以 |cos α| 为自变量的表
    Tabulated(LookUpTable),
}

impl PoleDensity {
    /// cos_beta: 晶面法向与择优方向夹角余弦
    pub fn new(sharpness: f64, cos_beta: f64) -> Result<Self> {
        if sharpness == 1.0 {
            return Ok(PoleDensity::Isotropic);
        }
        let cos_beta = cos_beta.clamp(-1.0, 1.0);
        let sin_beta = (1.0 - cos_beta * cos_beta).max(0.0).sqrt();
        if sin_beta < ALIGNED_SIN_LIMIT {
            return Ok(PoleDensity::Aligned { sharpness });
        }

        let nodes = periodic_nodes(SPIN_STEPS);
        let c = linspace(0.0, 1.0, POLE_TABLE_POINTS);
        let p = c
            .iter()
            .map(|&ca| {
                let sa = (1.0 - ca * ca).max(0.0).sqrt();
                nodes
                    .iter()
                    .map(|(cos_psi, _)| {
                        march_dollase(sharpness, ca * cos_beta + sa * sin_beta * cos_psi)
                    })
                    .sum::<f64>()
                    / SPIN_STEPS as f64
            })
            .collect();

        Ok(PoleDensity::Tabulated(LookUpTable::new(
            c,
            p,
            Extrapolate::ZeroZero,
        )?))
    }

    pub fn eval(&self, cos_alpha: f64) -> f64 {
        match self {
            PoleDensity::Isotropic => 1.0,
            PoleDensity::Aligned { sharpness } => march_dollase(*sharpness, cos_alpha),
            PoleDensity::Tabulated(table) => table.get(cos_alpha.abs().min(1.0)),
        }
    }
}

/// Bragg 锥上的平均极密度
///
/// 衍射矢量 Q̂(φ) = -sinθ·k̂ + cosθ·(cosφ·u + sinφ·v)，
/// `axis_k`、`axis_u`、`axis_v` 为织构轴在 (k̂, u, v) 上的投影。
pub fn cone_average(
    density: &PoleDensity,
    nodes: &[(f64, f64)],
    axis_k: f64,
    axis_u: f64,
    axis_v: f64,
    sin_theta: f64,
) -> f64 {
    if let PoleDensity::Isotropic = density {
        return 1.0;
    }
    let cos_theta = (1.0 - sin_theta * sin_theta).max(0.0).sqrt();
    let along = -sin_theta * axis_k;
    let sum: f64 = nodes
        .iter()
        .map(|(c, s)| density.eval(along + cos_theta * (c * axis_u + s * axis_v)))
        .sum();
    sum / nodes.len() as f64
}
