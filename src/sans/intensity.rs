//! # I(Q) 生成
//!
//! 在 Q 网格上合成散射强度曲线：
//! - Guinier-Porod 三段模型
//! - 硬球形状因子（单分散或半径分布加权平均）
//!
//! ## Guinier-Porod
//! ```text
//! I(Q) = C·Q^-p                         Q < Q1
//!      = A·Q^-s·exp(-Q²rg²/(3-s))       Q1 ≤ Q < Q2
//!      = B·Q^-m                         Q ≥ Q2
//! ```
//! C、B 取使各段在分界点连续的值。
//!
//! ## 硬球
//! I(Q) = V²·ρ²·P(QR)² / N，P(x) = 3(sin x - x cos x)/x³，N = V·n 为每颗粒原子数。
//! ρ 单位 √barn/Å³，因此 I 的单位为 barn/sr/atom。
//!
//! ## 依赖关系
//! - 被 `sans/model.rs`、`sans/isotropic.rs` 使用
//! - 使用 `math/grid.rs` 与 `models/material.rs` 的散射长度密度

use crate::error::{Result, SansError};
use crate::math::grid::geomspace;
use crate::models::ScatteringDensity;
use crate::neutron::ekin2ksq;
use crate::sans::params::GpfParams;

use std::f64::consts::PI;

/// Q 网格点数
pub const Q_GRID_POINTS: usize = 100_000;

/// 网格覆盖的最高中子能量 (eV)
pub const Q_GRID_EMAX: f64 = 100.0;

/// 硬球网格起点 (Å⁻¹)
pub const HARD_SPHERE_Q_MIN: f64 = 1e-6;

/// 低于此 x = QR 时使用形状因子的级数展开
const FORM_FACTOR_SERIES_LIMIT: f64 = 1e-3;

/// 网格上限：Q_GRID_EMAX 对应的 2k
pub fn q_grid_max() -> f64 {
    2.0 * ekin2ksq(Q_GRID_EMAX).sqrt()
}

/// GPF 的 Q 网格与 I(Q)
pub fn guinier_porod(params: &GpfParams) -> Result<(Vec<f64>, Vec<f64>)> {
    params.validate()?;
    let q = geomspace(params.q_min, q_grid_max(), Q_GRID_POINTS);

    let GpfParams {
        a, s, rg, m, p, q1, ..
    } = *params;
    let q2 = params.q2();

    let i1 = q.partition_point(|&v| v < q1);
    let i2 = q.partition_point(|&v| v < q2);
    if i1 == 0 || i1 == q.len() {
        return Err(SansError::BadInput(format!(
            "GPF Q1 = {} lies outside the Q grid",
            q1
        )));
    }
    if i2 == q.len() {
        return Err(SansError::BadInput(format!(
            "GPF Q2 = {} lies outside the Q grid",
            q2
        )));
    }
    if i2 <= i1 {
        return Err(SansError::BadInput(format!(
            "GPF requires Q1 < Q2 on the grid, got Q1 = {} and Q2 = {}",
            q1, q2
        )));
    }

    let guinier = |x: f64| a * x.powf(-s) * (-x * x * rg * rg / (3.0 - s)).exp();
    let c = guinier(q1) * q1.powf(p);
    let b = guinier(q2) * q2.powf(m);

    let iq = q
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            if i < i1 {
                c * x.powf(-p)
            } else if i < i2 {
                guinier(x)
            } else {
                b * x.powf(-m)
            }
        })
        .collect();

    Ok((q, iq))
}

/// 球形状因子振幅 P(x) = 3(sin x - x cos x)/x³
pub fn sphere_form_factor(x: f64) -> f64 {
    let x = x.abs();
    if x < FORM_FACTOR_SERIES_LIMIT {
        return 1.0 - x * x / 10.0;
    }
    3.0 * (x.sin() - x * x.cos()) / (x * x * x)
}

/// 带权重的球半径分布（半径单位 Å）
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusDistribution {
    radii: Vec<f64>,
    weights: Vec<f64>,
}

impl RadiusDistribution {
    pub fn mono(radius: f64) -> Result<Self> {
        Self::new(vec![radius], vec![1.0])
    }

    pub fn new(radii: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        if radii.len() != weights.len() || radii.is_empty() {
            return Err(SansError::BadInput(format!(
                "radius distribution needs matching non-empty columns ({} vs {})",
                radii.len(),
                weights.len()
            )));
        }
        if radii.iter().any(|r| !(*r > 0.0) || !r.is_finite()) {
            return Err(SansError::BadInput(
                "sphere radii must be strictly positive".to_string(),
            ));
        }
        if weights.iter().any(|w| !(*w >= 0.0) || !w.is_finite()) {
            return Err(SansError::BadInput(
                "radius frequencies must be finite and non-negative".to_string(),
            ));
        }
        if !(weights.iter().sum::<f64>() > 0.0) {
            return Err(SansError::BadInput(
                "radius distribution has zero total frequency".to_string(),
            ));
        }
        Ok(Self { radii, weights })
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// 频率加权平均半径
    pub fn mean_radius(&self) -> f64 {
        let total: f64 = self.weights.iter().sum();
        self.radii
            .iter()
            .zip(self.weights.iter())
            .map(|(r, w)| r * w)
            .sum::<f64>()
            / total
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.radii.iter().copied().zip(self.weights.iter().copied())
    }
}

/// 硬球 I(Q)，对半径分布按频率平均
pub fn hard_sphere_intensity(
    q: &[f64],
    radii: &RadiusDistribution,
    density: &ScatteringDensity,
) -> Vec<f64> {
    let total: f64 = radii.iter().map(|(_, w)| w).sum();
    let rho_sq = density.sld * density.sld;

    // 每个半径的前因子 V²ρ²/N = Vρ²/n
    let terms: Vec<(f64, f64)> = radii
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .map(|(r, w)| {
            let volume = 4.0 / 3.0 * PI * r * r * r;
            (r, w / total * volume * rho_sq / density.number_density)
        })
        .collect();

    q.iter()
        .map(|&x| {
            terms
                .iter()
                .map(|(r, pref)| {
                    let ff = sphere_form_factor(x * r);
                    pref * ff * ff
                })
                .sum::<f64>()
        })
        .collect()
}

/// 硬球模型使用的 Q 网格
pub fn hard_sphere_grid() -> Vec<f64> {
    geomspace(HARD_SPHERE_Q_MIN, q_grid_max(), Q_GRID_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpf() -> GpfParams {
        GpfParams {
            a: 1e-3,
            s: 0.5,
            rg: 50.0,
            m: 4.0,
            p: 1.5,
            q_min: 1e-5,
            q1: 0.016,
        }
    }

    #[test]
    fn test_guinier_porod_is_continuous() {
        let params = gpf();
        let (q, iq) = guinier_porod(&params).unwrap();
        assert_eq!(q.len(), Q_GRID_POINTS);
        assert!(iq.iter().all(|v| *v > 0.0 && v.is_finite()));

        // 分界两侧相对跳变应与网格步长同量级
        for boundary in [params.q1, params.q2()] {
            let i = q.partition_point(|&v| v < boundary);
            let jump = (iq[i] / iq[i - 1] - 1.0).abs();
            assert!(jump < 1e-2, "boundary {} jump {}", boundary, jump);
        }
    }

    #[test]
    fn test_guinier_porod_rejects_bad_ordering() {
        let mut params = gpf();
        params.rg = 500.0;
        let err = guinier_porod(&params).unwrap_err();
        assert!(err.is_bad_input());
    }

    #[test]
    fn test_form_factor_limits() {
        assert_eq!(sphere_form_factor(0.0), 1.0);
        let x: f64 = 2e-3;
        let exact = 3.0 * (x.sin() - x * x.cos()) / (x * x * x);
        assert!((sphere_form_factor(9e-4) - (1.0 - 8.1e-7 / 10.0)).abs() < 1e-15);
        assert!((exact - (1.0 - x * x / 10.0)).abs() < 1e-6);
        // 第一个零点 tan x = x, x ≈ 4.4934
        assert!(sphere_form_factor(4.493409457909064).abs() < 1e-12);
    }

    #[test]
    fn test_hard_sphere_low_q_limit() {
        let density = ScatteringDensity::diamond();
        let r = 20.0;
        let dist = RadiusDistribution::mono(r).unwrap();
        let iq = hard_sphere_intensity(&[1e-8], &dist, &density);
        let volume = 4.0 / 3.0 * PI * r * r * r;
        let expected = volume * density.sld * density.sld / density.number_density;
        assert!((iq[0] / expected - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_distribution_average() {
        let density = ScatteringDensity::diamond();
        let a = RadiusDistribution::mono(10.0).unwrap();
        let b = RadiusDistribution::mono(30.0).unwrap();
        let mix = RadiusDistribution::new(vec![10.0, 30.0], vec![1.0, 3.0]).unwrap();
        assert!((mix.mean_radius() - 25.0).abs() < 1e-12);

        let q = [0.01, 0.05, 0.2];
        let ia = hard_sphere_intensity(&q, &a, &density);
        let ib = hard_sphere_intensity(&q, &b, &density);
        let im = hard_sphere_intensity(&q, &mix, &density);
        for i in 0..q.len() {
            let expected = 0.25 * ia[i] + 0.75 * ib[i];
            assert!((im[i] - expected).abs() <= 1e-12 * expected.abs().max(1e-300));
        }
    }

    #[test]
    fn test_radius_distribution_validation() {
        assert!(RadiusDistribution::new(vec![], vec![]).is_err());
        assert!(RadiusDistribution::new(vec![1.0, -2.0], vec![1.0, 1.0]).is_err());
        assert!(RadiusDistribution::new(vec![1.0], vec![0.0]).is_err());
    }
}
