//! # 中子能量与波矢换算
//!
//! 单位约定：能量 eV，波长 Å，波矢 Å⁻¹，截面 barn。
//!
//! ## 公式
//! E = ħ²k²/2m = C/λ²，其中 C = 0.0818042096 eV·Å²，k = 2π/λ
//!
//! ## 依赖关系
//! - 被 `sans/` 和 `texture/` 使用
//! - 无外部模块依赖

use std::f64::consts::PI;

/// E·λ² 常数 (eV·Å²)
pub const EKIN2WLSQ: f64 = 0.081_804_209_605_330_9;

/// (2π)²
pub const K4PI_SQ: f64 = 4.0 * PI * PI;

/// 波长 (Å) -> 动能 (eV)
pub fn wl2ekin(wl: f64) -> f64 {
    if wl == 0.0 {
        return f64::INFINITY;
    }
    EKIN2WLSQ / (wl * wl)
}

/// 动能 (eV) -> 波长 (Å)，零能量对应无穷大波长
pub fn ekin2wl(ekin: f64) -> f64 {
    if ekin <= 0.0 {
        return f64::INFINITY;
    }
    (EKIN2WLSQ / ekin).sqrt()
}

/// 动能 (eV) -> k² (Å⁻²)
pub fn ekin2ksq(ekin: f64) -> f64 {
    ekin * K4PI_SQ / EKIN2WLSQ
}

/// 动能 (eV) -> k (Å⁻¹)
pub fn ekin2k(ekin: f64) -> f64 {
    ekin2ksq(ekin.max(0.0)).sqrt()
}

/// k² (Å⁻²) -> 动能 (eV)
pub fn ksq2ekin(ksq: f64) -> f64 {
    ksq * EKIN2WLSQ / K4PI_SQ
}

/// k (Å⁻¹) -> 动能 (eV)
pub fn k2ekin(k: f64) -> f64 {
    ksq2ekin(k * k)
}

/// 各向同性散射结果：末态能量与散射角余弦
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterOutcome {
    /// 末态动能 (eV)
    pub ekin_final: f64,
    /// cos(散射角)
    pub mu: f64,
}

/// 带出射方向的散射结果（各向异性模型使用）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedOutcome {
    pub ekin_final: f64,
    pub mu: f64,
    /// 出射方向（单位向量）
    pub direction: [f64; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wavelength_energy_roundtrip() {
        let wl = 1.798;
        let ekin = wl2ekin(wl);
        // 1.798 Å ≈ 25.3 meV
        assert!((ekin - 0.0253).abs() < 1e-4, "got {}", ekin);
        assert!((ekin2wl(ekin) - wl).abs() < 1e-12);
    }

    #[test]
    fn test_k_matches_two_pi_over_wavelength() {
        let wl = 4.0;
        let k = ekin2k(wl2ekin(wl));
        assert!((k - 2.0 * PI / wl).abs() < 1e-12);
        assert!((k2ekin(k) - wl2ekin(wl)).abs() < 1e-15);
    }

    #[test]
    fn test_zero_energy_guards() {
        assert!(ekin2wl(0.0).is_infinite());
        assert_eq!(ekin2k(0.0), 0.0);
        assert!(wl2ekin(0.0).is_infinite());
    }
}
