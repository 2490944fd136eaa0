//! # 晶面列表生成
//!
//! 由晶体结构生成中子衍射晶面：d 间距、相干结构因子 |F|² 与晶面法向。
//!
//! ## 算法概述
//! 1. 计算倒格矢
//! 2. 遍历 |G| ≤ 2π/d_min 内的 (hkl)，±hkl 只保留第一个非零指数为正的一个
//! 3. 结构因子 F = Σ b_j·exp(2πi(h·x_j + k·y_j + l·z_j))，b 以 √barn 计
//! 4. 丢弃 |F|² < 1e-10 的消光晶面，按 d 降序排列
//!
//! ## 依赖关系
//! - 被 `texture/model.rs` 使用
//! - 使用 `models/structure.rs` 的 Crystal, Lattice
//! - 使用 `texture/scatlen.rs` 获取相干散射长度

use crate::error::{Result, SansError};
use crate::math::vector::{norm, scale, Vec3};
use crate::models::{Crystal, Lattice, MaterialInfo};
use crate::texture::scatlen;

use std::cmp::Ordering;
use std::f64::consts::PI;

/// 单方向 Miller 指数上限
const MAX_HKL: i32 = 60;

/// 消光阈值 (barn)
const FSQ_CUTOFF: f64 = 1e-10;

/// 结构概要
#[derive(Debug, Clone)]
pub struct StructureInfo {
    /// 晶胞体积 (Å³)
    pub volume: f64,
    /// 晶胞原子数
    pub n_atoms: usize,
    pub lattice: Lattice,
}

/// 单个衍射晶面（±hkl 中的一个）
#[derive(Debug, Clone, PartialEq)]
pub struct HklPlane {
    pub hkl: [i32; 3],
    /// d 间距 (Å)
    pub d_spacing: f64,
    /// |F|² (barn)
    pub fsquared: f64,
    /// 晶体笛卡尔坐标系中的单位法向
    pub normal: Vec3,
}

/// 晶面来源
pub trait PlaneProvider {
    fn structure_info(&self) -> StructureInfo;

    /// d ≥ dmin 的晶面，按 d 降序
    fn planes(&self, dmin: f64) -> Result<Vec<HklPlane>>;
}

/// 由晶体结构直接计算晶面
#[derive(Debug, Clone)]
pub struct StdPlaneProvider {
    crystal: Crystal,
    /// 每个原子的相干散射长度 (√barn)
    lengths: Vec<f64>,
}

impl StdPlaneProvider {
    pub fn new(crystal: Crystal) -> Result<Self> {
        if crystal.atoms.is_empty() {
            return Err(SansError::BadInput(format!(
                "Structure '{}' has no atoms",
                crystal.name
            )));
        }
        if !(crystal.lattice.volume() > 1e-10) {
            return Err(SansError::BadInput(format!(
                "Structure '{}' has a degenerate unit cell",
                crystal.name
            )));
        }

        let lengths = crystal
            .atoms
            .iter()
            .map(|atom| {
                scatlen::coherent_length_sqrt_barn(&atom.element).ok_or_else(|| {
                    SansError::BadInput(format!(
                        "No coherent scattering length known for element '{}'",
                        atom.element
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self { crystal, lengths })
    }

    pub fn from_material(info: &MaterialInfo) -> Result<Self> {
        Self::new(info.crystal()?.clone())
    }

    /// 结构因子 F(hkl)，实部与虚部
    fn structure_factor(&self, h: i32, k: i32, l: i32) -> (f64, f64) {
        let mut f_real = 0.0;
        let mut f_imag = 0.0;

        for (atom, b) in self.crystal.atoms.iter().zip(self.lengths.iter()) {
            let [x, y, z] = atom.position;
            let phase = 2.0 * PI * (h as f64 * x + k as f64 * y + l as f64 * z);
            let (s, c) = phase.sin_cos();
            f_real += b * c;
            f_imag += b * s;
        }

        (f_real, f_imag)
    }
}

impl PlaneProvider for StdPlaneProvider {
    fn structure_info(&self) -> StructureInfo {
        StructureInfo {
            volume: self.crystal.lattice.volume(),
            n_atoms: self.crystal.atoms.len(),
            lattice: self.crystal.lattice.clone(),
        }
    }

    fn planes(&self, dmin: f64) -> Result<Vec<HklPlane>> {
        if !(dmin > 0.0) {
            return Err(SansError::InvalidArgument(format!(
                "dmin must be positive, got {}",
                dmin
            )));
        }

        let recip = self.crystal.lattice.reciprocal();
        let g_max = 2.0 * PI / dmin;
        let (a, b, c, _, _, _) = self.crystal.lattice.parameters();
        let bound = |len: f64| ((len / dmin).floor() as i32).min(MAX_HKL);
        let (hmax, kmax, lmax) = (bound(a), bound(b), bound(c));

        let mut planes = Vec::new();
        for h in -hmax..=hmax {
            for k in -kmax..=kmax {
                for l in -lmax..=lmax {
                    if !is_positive_representative(h, k, l) {
                        continue;
                    }

                    let g = reciprocal_vector(&recip, h, k, l);
                    let g_mag = norm(&g);
                    if g_mag < 1e-10 || g_mag > g_max {
                        continue;
                    }

                    let (f_real, f_imag) = self.structure_factor(h, k, l);
                    let fsquared = f_real * f_real + f_imag * f_imag;
                    if fsquared < FSQ_CUTOFF {
                        continue;
                    }

                    planes.push(HklPlane {
                        hkl: [h, k, l],
                        d_spacing: 2.0 * PI / g_mag,
                        fsquared,
                        normal: scale(&g, 1.0 / g_mag),
                    });
                }
            }
        }

        planes.sort_by(|p, q| {
            q.d_spacing
                .partial_cmp(&p.d_spacing)
                .unwrap_or(Ordering::Equal)
                .then_with(|| p.hkl.cmp(&q.hkl))
        });

        Ok(planes)
    }
}

/// ±hkl 中第一个非零指数为正者
fn is_positive_representative(h: i32, k: i32, l: i32) -> bool {
    match (h, k, l) {
        (0, 0, 0) => false,
        (0, 0, l) => l > 0,
        (0, k, _) => k > 0,
        (h, _, _) => h > 0,
    }
}

/// G = h*b1 + k*b2 + l*b3
fn reciprocal_vector(recip: &[[f64; 3]; 3], h: i32, k: i32, l: i32) -> Vec3 {
    let (hf, kf, lf) = (h as f64, k as f64, l as f64);
    [
        hf * recip[0][0] + kf * recip[1][0] + lf * recip[2][0],
        hf * recip[0][1] + kf * recip[1][1] + lf * recip[2][1],
        hf * recip[0][2] + kf * recip[1][2] + lf * recip[2][2],
    ]
}
