//! # I(Q) 积分与 Q 抽样
//!
//! 由散射强度曲线 I(Q) 构造随能量变化的总截面曲线，并按 Q·I(Q) 权重抽样动量转移。
//!
//! ## 截面曲线
//! σ(k) = 2π/k² · ∫₀^{2k} Q·I(Q) dQ
//!
//! - 首点取低 Q 极限：k₀ = Q_min/2 处 σ = 4π·I(Q_min)
//! - 之后每个 Q_i 视为新的 2k_i，梯形累加
//!   σ_i·k_i² = σ_{i-1}·k_{i-1}² + π·ΔQ·(Q_i·I_i + Q_{i-1}·I_{i-1})
//!
//! ## Q 抽样
//! 在 Q·I(Q) 分段线性分布上做逆累积抽样，拒绝 Q > 2k 的结果。
//! 拒绝次数有上限，超出后直接在 [Q_min, 2k] 截断分布上反解，与拒绝抽样同分布。
//!
//! ## 依赖关系
//! - 使用 `math/lookup.rs`、`math/pointwise.rs`
//! - 被 `sans/model.rs`、`sans/isotropic.rs` 使用

use crate::error::{Result, SansError};
use crate::math::{Extrapolate, LookUpTable, PointwiseDist};
use crate::neutron::{ekin2k, ekin2ksq, ksq2ekin};

use rand::Rng;
use std::f64::consts::PI;

/// 拒绝抽样最大尝试次数
pub const MAX_REJECTION_TRIES: usize = 64;

/// I(Q) 积分辅助器
#[derive(Debug, Clone)]
pub struct IofQHelper {
    /// 能量 (eV) -> σ (2π/k² 约定)
    xs_curve: LookUpTable,
    /// Q·I(Q) 抽样分布
    q_dist: PointwiseDist,
    /// 表格末点能量 (2k = Q_max)
    ekin_max: f64,
}

impl IofQHelper {
    /// 由 (Q, I) 表构造；Q 需严格递增且 Q_min > 0
    pub fn new(q: Vec<f64>, iq: Vec<f64>, extrapolate: Extrapolate) -> Result<Self> {
        if q.len() != iq.len() {
            return Err(SansError::BadInput(format!(
                "Q and I(Q) have different size ({} vs {})",
                q.len(),
                iq.len()
            )));
        }
        if q.len() < 2 {
            return Err(SansError::BadInput(
                "I(Q) table needs at least two points".to_string(),
            ));
        }
        if q.iter().chain(iq.iter()).any(|v| !v.is_finite()) {
            return Err(SansError::BadInput(
                "I(Q) table contains non-finite values".to_string(),
            ));
        }
        if !(q[0] > 0.0) {
            return Err(SansError::BadInput(format!(
                "I(Q) table must start at Q > 0, got {}",
                q[0]
            )));
        }
        if q.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(SansError::BadInput(
                "Q values are not strictly ascending".to_string(),
            ));
        }

        let (energies, xs) = build_xs_curve(&q, &iq);
        let ekin_max = energies[energies.len() - 1];
        let xs_curve = LookUpTable::new(energies, xs, extrapolate)?;

        let weights: Vec<f64> = q
            .iter()
            .zip(iq.iter())
            .map(|(qi, ii)| (qi * ii).max(0.0))
            .collect();
        let q_dist = PointwiseDist::new(q, weights)?;

        Ok(Self {
            xs_curve,
            q_dist,
            ekin_max,
        })
    }

    /// 表格 Q 范围 (Å⁻¹)
    pub fn q_range(&self) -> (f64, f64) {
        (self.q_dist.x_min(), self.q_dist.x_max())
    }

    /// 截面 σ(E) = 2π/k²·∫₀^{2k} Q·I dQ (barn)
    pub fn cross_section(&self, ekin: f64) -> f64 {
        self.xs_curve.get(ekin)
    }

    /// ∫₀^{2k} Q·I(Q) dQ，2k 超出表格时取全表积分
    pub fn qiofq_integral(&self, ekin: f64) -> f64 {
        let ekin = ekin.min(self.ekin_max);
        let ksq = ekin2ksq(ekin);
        if !(ksq > 0.0) {
            return 0.0;
        }
        self.xs_curve.get(ekin) * ksq / (2.0 * PI)
    }

    /// 抽样动量转移 Q，保证 Q ≤ 2k
    pub fn sample_q<R: Rng + ?Sized>(&self, rng: &mut R, ekin: f64) -> f64 {
        let q_kin = 2.0 * ekin2k(ekin);
        if !(q_kin > 0.0) {
            return 0.0;
        }

        let cdf_kin = self.q_dist.cdf_at(q_kin);
        if !(cdf_kin > 0.0) {
            // 2k 低于表格起点：I(Q) 视为常数，密度 ∝ Q
            return q_kin * rng.gen::<f64>().sqrt();
        }

        for _ in 0..MAX_REJECTION_TRIES {
            let q = self.q_dist.percentile(rng.gen::<f64>());
            if q <= q_kin {
                return q;
            }
        }

        self.q_dist
            .percentile(rng.gen::<f64>() * cdf_kin)
            .min(q_kin)
    }
}

/// 折叠 Q 网格得到 (能量, 截面) 点
fn build_xs_curve(q: &[f64], iq: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let k0 = 0.5 * q[0];
    let seed = (ksq2ekin(k0 * k0), 4.0 * PI * iq[0], k0 * k0);

    let points = q
        .windows(2)
        .zip(iq.windows(2))
        .scan(seed, |(_, xs_prev, ksq_prev), (qw, iw)| {
            let k = 0.5 * qw[1];
            let ksq = k * k;
            let panel = PI * (qw[1] - qw[0]) * (iw[1] * qw[1] + iw[0] * qw[0]);
            let xs = (*xs_prev * *ksq_prev + panel) / ksq;
            *xs_prev = xs;
            *ksq_prev = ksq;
            Some((ksq2ekin(ksq), xs))
        });

    std::iter::once((seed.0, seed.1)).chain(points).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat_helper() -> IofQHelper {
        let q = crate::math::grid::geomspace(1e-3, 1.0, 2000);
        let iq = vec![2.0; q.len()];
        IofQHelper::new(q, iq, Extrapolate::ConstOverSqrtX).unwrap()
    }

    #[test]
    fn test_flat_intensity_gives_four_pi_i() {
        // I 为常数时 σ = 2π/k²·I·(2k)²/2 = 4π·I
        let h = flat_helper();
        for q in [0.002, 0.05, 0.3, 0.9] {
            let ekin = ksq2ekin(0.25 * q * q);
            let xs = h.cross_section(ekin);
            assert!((xs - 8.0 * PI).abs() < 1e-6, "q = {}, xs = {}", q, xs);
        }
    }

    #[test]
    fn test_integral_matches_analytic() {
        // I = Q⁻¹：∫ Q·I dQ = 2k - Q_min (加首点 Q_min/2 贡献)
        let q = crate::math::grid::linspace(0.01, 2.0, 4001);
        let iq: Vec<f64> = q.iter().map(|v| 1.0 / v).collect();
        let k = 0.5 * q[2000];
        let h = IofQHelper::new(q, iq, Extrapolate::ZeroZero).unwrap();
        let ekin = ksq2ekin(k * k);
        let expected = 2.0 * k - 0.01 + 0.01 * 0.01 * 100.0 * 0.5;
        assert!(h.qiofq_integral(0.0) == 0.0);
        assert!((h.qiofq_integral(ekin) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_integral_holds_above_table() {
        let q = crate::math::grid::linspace(1e-3, 0.5, 500);
        let iq = vec![3.0; q.len()];
        let h = IofQHelper::new(q, iq, Extrapolate::ZeroZero).unwrap();
        let full = h.qiofq_integral(ksq2ekin(0.25 * 0.25));
        assert!((full - 0.375).abs() < 1e-9, "full = {}", full);
        for ekin in [ksq2ekin(0.3 * 0.3), ksq2ekin(4.0), 1.0] {
            assert_eq!(h.qiofq_integral(ekin), full);
        }
    }

    #[test]
    fn test_first_point_is_low_q_limit() {
        let h = IofQHelper::new(vec![0.01, 0.02], vec![3.0, 1.0], Extrapolate::ZeroZero).unwrap();
        let ekin = ksq2ekin(0.005 * 0.005);
        assert!((h.cross_section(ekin) - 12.0 * PI).abs() < 1e-9);
        assert_eq!(h.cross_section(ekin * 0.5), 0.0);
    }

    #[test]
    fn test_sampled_q_never_exceeds_kinematic_limit() {
        let h = flat_helper();
        let mut rng = StdRng::seed_from_u64(7);
        for ekin in [1e-6, 1e-5, 1e-4, 1e-3, 0.0253] {
            let q_kin = 2.0 * ekin2k(ekin);
            for _ in 0..500 {
                let q = h.sample_q(&mut rng, ekin);
                assert!(q <= q_kin, "ekin = {}, q = {}, 2k = {}", ekin, q, q_kin);
                assert!(q >= 0.0);
            }
        }
    }

    #[test]
    fn test_sampling_below_table_start() {
        let h = IofQHelper::new(vec![0.5, 1.0], vec![1.0, 1.0], Extrapolate::ZeroZero).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let ekin = ksq2ekin(0.1 * 0.1);
        for _ in 0..100 {
            let q = h.sample_q(&mut rng, ekin);
            assert!(q <= 0.2);
        }
        assert_eq!(h.sample_q(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(IofQHelper::new(vec![0.0, 1.0], vec![1.0, 1.0], Extrapolate::ZeroZero).is_err());
        assert!(IofQHelper::new(vec![0.1], vec![1.0], Extrapolate::ZeroZero).is_err());
        assert!(IofQHelper::new(vec![0.2, 0.1], vec![1.0, 1.0], Extrapolate::ZeroZero).is_err());
        assert!(
            IofQHelper::new(vec![0.1, 0.2], vec![1.0, 1.0, 1.0], Extrapolate::ZeroZero).is_err()
        );
    }
}
