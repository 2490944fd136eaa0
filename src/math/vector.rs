//! # 三维向量与旋转矩阵
//!
//! 轻量的 `[f64; 3]` 向量运算、旋转矩阵，以及给定散射角余弦的方向抽样。
//!
//! ## 依赖关系
//! - 被 `texture/` 使用（倒格矢、取向、出射方向）
//! - 使用 `rand` 抽取方位角

use crate::error::{Result, SansError};

use rand::Rng;
use std::f64::consts::PI;

pub type Vec3 = [f64; 3];

/// 向量点积
pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 向量叉积
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

pub fn scale(a: &Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// 归一化；零向量返回 None
pub fn normalize(a: &Vec3) -> Option<Vec3> {
    let n = norm(a);
    if n > 0.0 && n.is_finite() {
        Some(scale(a, 1.0 / n))
    } else {
        None
    }
}

/// 与单位向量 v 正交的一组单位基 (u, w)，满足 u × w = v
pub fn orthonormal_basis(v: &Vec3) -> (Vec3, Vec3) {
    // 选取与 v 夹角最大的坐标轴作为辅助向量
    let helper = if v[0].abs() <= v[1].abs() && v[0].abs() <= v[2].abs() {
        [1.0, 0.0, 0.0]
    } else if v[1].abs() <= v[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    let u = cross(&helper, v);
    let u = scale(&u, 1.0 / norm(&u));
    let w = cross(v, &u);
    (u, w)
}

/// 3x3 旋转矩阵（行主序）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotMatrix {
    pub m: [[f64; 3]; 3],
}

impl RotMatrix {
    pub fn identity() -> Self {
        RotMatrix {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn transpose(&self) -> Self {
        let m = self.m;
        RotMatrix {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    /// 矩阵乘向量
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        [dot(&self.m[0], v), dot(&self.m[1], v), dot(&self.m[2], v)]
    }

    /// 由两对 (晶体系方向, 实验室系方向) 构造 lab -> crystal 旋转。
    /// 第一对精确对齐，第二对仅用于确定绕第一轴的转角。
    pub fn lab_to_crystal(
        crys1: &Vec3,
        lab1: &Vec3,
        crys2: &Vec3,
        lab2: &Vec3,
    ) -> Result<Self> {
        let c = orthonormal_triad(crys1, crys2)
            .ok_or_else(|| SansError::BadInput("degenerate crystal directions".to_string()))?;
        let l = orthonormal_triad(lab1, lab2)
            .ok_or_else(|| SansError::BadInput("degenerate lab directions".to_string()))?;

        // R = Σ c_i ⊗ l_i 把 l_i 映射到 c_i
        let mut m = [[0.0; 3]; 3];
        for i in 0..3 {
            for r in 0..3 {
                for s in 0..3 {
                    m[r][s] += c[i][r] * l[i][s];
                }
            }
        }
        Ok(RotMatrix { m })
    }
}

/// Gram-Schmidt 正交三元组
fn orthonormal_triad(a: &Vec3, b: &Vec3) -> Option<[Vec3; 3]> {
    let e1 = normalize(a)?;
    let proj = dot(&e1, b);
    let b_perp = [b[0] - proj * e1[0], b[1] - proj * e1[1], b[2] - proj * e1[2]];
    let e2 = normalize(&b_perp)?;
    if norm(&b_perp) < 1e-9 * norm(b) {
        return None;
    }
    let e3 = cross(&e1, &e2);
    Some([e1, e2, e3])
}

/// 给定散射角余弦 mu，绕入射方向均匀抽取方位角得到出射方向
pub fn rotate_direction<R: Rng + ?Sized>(direction: &Vec3, mu: f64, rng: &mut R) -> Vec3 {
    let phi = rng.gen_range(0.0..2.0 * PI);
    let mu = mu.clamp(-1.0, 1.0);
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

    let Some(d) = normalize(direction) else {
        return *direction;
    };
    let (u, w) = orthonormal_basis(&d);
    let (c, s) = (phi.cos(), phi.sin());

    let out = [
        mu * d[0] + sin_theta * (c * u[0] + s * w[0]),
        mu * d[1] + sin_theta * (c * u[1] + s * w[1]),
        mu * d[2] + sin_theta * (c * u[2] + s * w[2]),
    ];
    normalize(&out).unwrap_or(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_basis_is_orthonormal() {
        for v in [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.3, -0.4, 0.866]] {
            let v = normalize(&v).unwrap();
            let (u, w) = orthonormal_basis(&v);
            assert!(dot(&u, &v).abs() < 1e-12);
            assert!(dot(&w, &v).abs() < 1e-12);
            assert!(dot(&u, &w).abs() < 1e-12);
            assert!((norm(&u) - 1.0).abs() < 1e-12);
            assert!((norm(&w) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotate_direction_keeps_cosine() {
        let mut rng = StdRng::seed_from_u64(42);
        let d = normalize(&[1.0, 2.0, -0.5]).unwrap();
        for mu in [-1.0, -0.3, 0.0, 0.5, 0.999, 1.0] {
            let out = rotate_direction(&d, mu, &mut rng);
            assert!((norm(&out) - 1.0).abs() < 1e-12);
            assert!((dot(&out, &d) - mu).abs() < 1e-9, "mu = {}", mu);
        }
    }

    #[test]
    fn test_lab_to_crystal_maps_pairs() {
        let r = RotMatrix::lab_to_crystal(
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
            &[1.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
        )
        .unwrap();
        let c1 = r.apply(&[0.0, 0.0, 1.0]);
        assert!((c1[1] - 1.0).abs() < 1e-12);
        let back = r.transpose().apply(&[0.0, 1.0, 0.0]);
        assert!((back[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lab_to_crystal_rejects_parallel_pairs() {
        let r = RotMatrix::lab_to_crystal(
            &[1.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[2.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
        );
        assert!(r.is_err());
    }
}
