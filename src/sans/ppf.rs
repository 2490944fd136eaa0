//! # 分段幂律模型的解析截面与抽样
//!
//! I(Q) = A1·Q^-b1 (Q < Q0)，A2·Q^-b2 (Q ≥ Q0)
//!
//! 部分积分 F(x) = ∫₀^x Q·I(Q) dQ 有闭式解，因此截面与逆累积分布都无需查表：
//! ```text
//! σ(k) = c · 2π/k² · F(2k)
//! F(x) = A1/(2-b1)·x^(2-b1)                                       x < Q0
//!      = A1/(2-b1)·Q0^(2-b1) + A2/(2-b2)·(x^(2-b2) - Q0^(2-b2))   x ≥ Q0
//! ```
//! 抽样时取 F(Q) = r·F(2k) 反解 Q。
//!
//! ## 依赖关系
//! - 被 `sans/model.rs` 使用

use crate::neutron::ekin2k;
use crate::sans::params::PpfParams;

use rand::Rng;
use std::f64::consts::PI;

impl PpfParams {
    fn low_exponent(&self) -> f64 {
        2.0 - self.b1
    }

    fn high_exponent(&self) -> f64 {
        2.0 - self.b2
    }

    /// 低 Q 段在 Q0 处的累积值
    fn low_total(&self) -> f64 {
        self.a1 / self.low_exponent() * self.q0.powf(self.low_exponent())
    }

    /// F(x) = ∫₀^x Q·I(Q) dQ
    pub fn partial_integral(&self, x: f64) -> f64 {
        if !(x > 0.0) {
            return 0.0;
        }
        if x < self.q0 {
            return self.a1 / self.low_exponent() * x.powf(self.low_exponent());
        }
        let e2 = self.high_exponent();
        self.low_total() + self.a2 / e2 * (x.powf(e2) - self.q0.powf(e2))
    }

    /// 强度 I(Q)
    pub fn intensity(&self, q: f64) -> f64 {
        if q < self.q0 {
            self.a1 * q.powf(-self.b1)
        } else {
            self.a2 * q.powf(-self.b2)
        }
    }

    /// 解析截面 (barn)
    pub fn cross_section(&self, ekin: f64) -> f64 {
        let k = ekin2k(ekin);
        if !(k > 0.0) {
            return 0.0;
        }
        self.correction * 2.0 * PI / (k * k) * self.partial_integral(2.0 * k)
    }

    /// 反解 F(Q) = r·F(2k)
    pub fn sample_q<R: Rng + ?Sized>(&self, rng: &mut R, ekin: f64) -> f64 {
        let q_kin = 2.0 * ekin2k(ekin);
        if !(q_kin > 0.0) {
            return 0.0;
        }

        let target = rng.gen::<f64>() * self.partial_integral(q_kin);
        let low_total = self.low_total();

        let q = if q_kin <= self.q0 || target < low_total {
            let e1 = self.low_exponent();
            (e1 * target / self.a1).powf(1.0 / e1)
        } else {
            let e2 = self.high_exponent();
            let base = (target - low_total) * e2 / self.a2 + self.q0.powf(e2);
            base.powf(1.0 / e2)
        };

        if q.is_finite() {
            q.clamp(0.0, q_kin)
        } else {
            q_kin
        }
    }
}
