//! # 结果报告模块
//!
//! 截面曲线与散射角直方图的数据结构、CSV 导出与绘图。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `scatter.rs` 的 ScatterModel
//! - 子模块: export, plot

pub mod export;
pub mod plot;

use crate::error::{Result, SansError};
use crate::math::grid::linspace;
use crate::math::vector::Vec3;
use crate::neutron::wl2ekin;
use crate::scatter::ScatterModel;

use serde::Serialize;

/// 截面曲线上的一点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XsPoint {
    /// 波长 (Å)
    pub wavelength: f64,
    /// 动能 (eV)
    pub ekin: f64,
    /// 截面 (barn)
    pub xs: f64,
}

/// 截面随波长的变化
#[derive(Debug, Clone)]
pub struct XsCurve {
    pub material: String,
    pub model: String,
    pub direction: Vec3,
    pub points: Vec<XsPoint>,
}

impl XsCurve {
    pub fn compute(
        model: &ScatterModel,
        material: &str,
        wl_range: (f64, f64),
        n_points: usize,
        direction: Vec3,
    ) -> Result<Self> {
        let (wl_min, wl_max) = wl_range;
        if !(wl_min > 0.0) || !(wl_max > wl_min) {
            return Err(SansError::InvalidRange(format!(
                "{}-{} (wavelengths must satisfy 0 < min < max)",
                wl_min, wl_max
            )));
        }
        if n_points < 2 {
            return Err(SansError::InvalidArgument(format!(
                "at least 2 points are needed, got {}",
                n_points
            )));
        }

        let points = linspace(wl_min, wl_max, n_points)
            .into_iter()
            .map(|wavelength| {
                let ekin = wl2ekin(wavelength);
                XsPoint {
                    wavelength,
                    ekin,
                    xs: model.calc_cross_section(ekin, &direction),
                }
            })
            .collect();

        Ok(Self {
            material: material.to_string(),
            model: model.kind().to_string(),
            direction,
            points,
        })
    }

    pub fn max_xs(&self) -> f64 {
        self.points.iter().map(|p| p.xs).fold(0.0, f64::max)
    }
}

/// μ 直方图的一个分箱
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MuBin {
    pub mu_low: f64,
    pub mu_high: f64,
    pub count: u64,
    /// 归一化概率密度
    pub density: f64,
}

/// [-1, 1] 上的 μ 直方图
#[derive(Debug, Clone, PartialEq)]
pub struct MuHistogram {
    counts: Vec<u64>,
    total: u64,
}

impl MuHistogram {
    pub fn new(n_bins: usize) -> Self {
        Self {
            counts: vec![0; n_bins.max(1)],
            total: 0,
        }
    }

    pub fn fill(&mut self, mu: f64) {
        let n = self.counts.len();
        let idx = (((mu.clamp(-1.0, 1.0) + 1.0) * 0.5 * n as f64) as usize).min(n - 1);
        self.counts[idx] += 1;
        self.total += 1;
    }

    /// 合并另一个同分箱直方图
    pub fn merge(&mut self, other: &MuHistogram) -> Result<()> {
        if other.counts.len() != self.counts.len() {
            return Err(SansError::LogicError(format!(
                "cannot merge histograms with {} and {} bins",
                self.counts.len(),
                other.counts.len()
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.total += other.total;
        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn bins(&self) -> Vec<MuBin> {
        let n = self.counts.len();
        let width = 2.0 / n as f64;
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| MuBin {
                mu_low: -1.0 + i as f64 * width,
                mu_high: -1.0 + (i + 1) as f64 * width,
                count,
                density: if self.total > 0 {
                    count as f64 / (self.total as f64 * width)
                } else {
                    0.0
                },
            })
            .collect()
    }
}

/// 抽样统计
#[derive(Debug, Clone)]
pub struct SampleSummary {
    pub material: String,
    pub model: String,
    pub wavelength: f64,
    pub n_events: u64,
    pub mean_mu: f64,
    pub histogram: MuHistogram,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomSection;
    use crate::sans::IsotropicSans;

    fn flat_model() -> ScatterModel {
        let section: CustomSection = ["DirectLoad", "Q 0.01 0.5 2.0", "I 1 1 1"]
            .iter()
            .map(|l| l.split_whitespace().map(String::from).collect())
            .collect();
        ScatterModel::Isotropic(IsotropicSans::from_section(&section, None).unwrap())
    }

    #[test]
    fn test_xs_curve() {
        let curve = XsCurve::compute(&flat_model(), "flat", (1.0, 10.0), 10, [0.0, 0.0, 1.0])
            .unwrap();
        assert_eq!(curve.points.len(), 10);
        assert_eq!(curve.model, "SANSISO");
        assert!((curve.points[0].wavelength - 1.0).abs() < 1e-12);
        assert!((curve.points[9].wavelength - 10.0).abs() < 1e-12);
        assert!(curve.points.iter().all(|p| p.xs >= 0.0));
        assert!(curve.max_xs() > 0.0);
    }

    #[test]
    fn test_xs_curve_rejects_bad_range() {
        let m = flat_model();
        assert!(XsCurve::compute(&m, "x", (5.0, 1.0), 10, [0.0, 0.0, 1.0]).is_err());
        assert!(XsCurve::compute(&m, "x", (0.0, 1.0), 10, [0.0, 0.0, 1.0]).is_err());
        assert!(XsCurve::compute(&m, "x", (1.0, 2.0), 1, [0.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_histogram() {
        let mut h = MuHistogram::new(4);
        for mu in [-1.0, -0.6, 0.1, 0.99, 1.0, 1.0] {
            h.fill(mu);
        }
        let bins = h.bins();
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 0, 1, 3]);
        let integral: f64 = bins.iter().map(|b| b.density * (b.mu_high - b.mu_low)).sum();
        assert!((integral - 1.0).abs() < 1e-12);

        let mut other = MuHistogram::new(4);
        other.fill(0.0);
        h.merge(&other).unwrap();
        assert_eq!(h.total(), 7);
        assert!(h.merge(&MuHistogram::new(3)).is_err());
    }
}
