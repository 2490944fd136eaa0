//! # 晶体织构取向模型
//!
//! 两个 March-Dollase 织构分量混合的各向异性相干弹性散射。
//!
//! ## 配置 (`@CUSTOM_CRYSTEXT`)
//! ```text
//! 0 0 1  0.8  0.6          # 择优方向 (晶体系)、R、体积分数
//! 1 0 0  1.2  0.4
//! orientation 0 0 1 0 0 1 1 0 0 1 0 0    # 可选：两对 (晶体方向, 实验室方向)
//! ```
//! 两个分量的体积分数之和必须为 1。
//!
//! ## 截面
//! ```text
//! σ(λ, k̂) = 2λ² · Σ_{hkl: λ ≤ 2d} s_hkl · Σ_c f_c·<P_c,hkl>_cone
//! s_hkl = d·|F|²·0.5 / (V·N)
//! ```
//! 晶面按 d 降序遍历，λ > 2d 后提前结束。
//!
//! ## 依赖关系
//! - 使用 `texture/planes.rs`、`texture/pddf.rs`
//! - 使用 `math/vector.rs` 的旋转与方向抽样
//! - 被 `scatter.rs` 使用

use crate::error::{Result, SansError};
use crate::math::vector::{dot, normalize, orthonormal_basis, rotate_direction, RotMatrix, Vec3};
use crate::models::{CustomSection, MaterialInfo};
use crate::neutron::{ekin2wl, DirectedOutcome};
use crate::texture::pddf::{cone_average, periodic_nodes, PoleDensity, TextureComponent};
use crate::texture::planes::{PlaneProvider, StdPlaneProvider};

use rand::Rng;

/// 配置段名称
pub const CRYSTEXT_SECTION: &str = "CRYSTEXT";

/// 体积分数之和允许的偏差
pub const FRACTION_TOLERANCE: f64 = 1e-12;

/// Bragg 锥积分分段数
pub const CONE_STEPS: usize = 72;

/// 累积权重允许超过 1 的舍入量
const CUMULATIVE_TOLERANCE: f64 = 1e-9;

/// 织构配置
#[derive(Debug, Clone, PartialEq)]
pub struct TextureConfig {
    pub components: [TextureComponent; 2],
    /// 实验室系 -> 晶体系
    pub orientation: RotMatrix,
}

impl TextureConfig {
    pub fn new(components: [TextureComponent; 2], orientation: RotMatrix) -> Result<Self> {
        let sum = components[0].fraction + components[1].fraction;
        if (sum - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(SansError::BadInput(format!(
                "Texture fractions must sum to 1, got {} + {} = {}",
                components[0].fraction, components[1].fraction, sum
            )));
        }
        Ok(Self {
            components,
            orientation,
        })
    }

    pub fn from_section(section: &CustomSection) -> Result<Self> {
        let mut orientation = RotMatrix::identity();
        let mut rows = Vec::new();

        for line in section {
            if line.first().map(String::as_str) == Some("orientation") {
                orientation = parse_orientation(&line[1..])?;
            } else {
                rows.push(line);
            }
        }

        if rows.len() != 2 || rows.iter().any(|r| r.len() != 5) {
            return Err(SansError::BadInput(format!(
                "Data in the @CUSTOM_{} section should be two lines of five numbers \
                 (direction x y z, March-Dollase coefficient, fraction)",
                CRYSTEXT_SECTION
            )));
        }

        let mut parsed = Vec::with_capacity(2);
        for row in rows {
            let v = parse_numbers(row)?;
            parsed.push(TextureComponent::new([v[0], v[1], v[2]], v[3], v[4])?);
        }

        Self::new([parsed[0], parsed[1]], orientation)
    }
}

fn parse_numbers(tokens: &[String]) -> Result<Vec<f64>> {
    tokens
        .iter()
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                SansError::BadInput(format!(
                    "Invalid value '{}' in the @CUSTOM_{} section",
                    t, CRYSTEXT_SECTION
                ))
            })
        })
        .collect()
}

fn parse_orientation(tokens: &[String]) -> Result<RotMatrix> {
    if tokens.len() != 12 {
        return Err(SansError::BadInput(format!(
            "orientation in the @CUSTOM_{} section takes 12 numbers, found {}",
            CRYSTEXT_SECTION,
            tokens.len()
        )));
    }
    let v = parse_numbers(tokens)?;
    RotMatrix::lab_to_crystal(
        &[v[0], v[1], v[2]],
        &[v[3], v[4], v[5]],
        &[v[6], v[7], v[8]],
        &[v[9], v[10], v[11]],
    )
}

/// 预计算的晶面
#[derive(Debug, Clone)]
struct TexturedPlane {
    hkl: [i32; 3],
    d_spacing: f64,
    /// d·|F|²·0.5/(V·N)
    strength: f64,
    poles: [PoleDensity; 2],
}

/// 晶面概要（用于列表输出）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSummary {
    pub hkl: [i32; 3],
    pub d_spacing: f64,
    pub strength: f64,
}

/// 晶体织构模型
#[derive(Debug, Clone)]
pub struct CrystallineTexture {
    planes: Vec<TexturedPlane>,
    fractions: [f64; 2],
    /// 织构轴（实验室系单位向量）
    axes: [Vec3; 2],
    nodes: Vec<(f64, f64)>,
}

impl CrystallineTexture {
    pub fn from_material(info: &MaterialInfo, dmin: f64) -> Result<Self> {
        let config = TextureConfig::from_section(info.get_custom_section(CRYSTEXT_SECTION)?)?;
        let provider = StdPlaneProvider::from_material(info)?;
        Self::new(&config, &provider, dmin)
    }

    pub fn new(config: &TextureConfig, provider: &dyn PlaneProvider, dmin: f64) -> Result<Self> {
        let info = provider.structure_info();
        if !(info.volume > 0.0) || info.n_atoms == 0 {
            return Err(SansError::BadInput(
                "Texture model needs a unit cell with positive volume and atoms".to_string(),
            ));
        }
        let norm_factor = 0.5 / (info.volume * info.n_atoms as f64);
        let [c0, c1] = config.components;

        let planes = provider
            .planes(dmin)?
            .into_iter()
            .map(|p| {
                Ok(TexturedPlane {
                    hkl: p.hkl,
                    d_spacing: p.d_spacing,
                    strength: p.d_spacing * p.fsquared * norm_factor,
                    poles: [
                        PoleDensity::new(c0.sharpness, dot(&p.normal, &c0.direction))?,
                        PoleDensity::new(c1.sharpness, dot(&p.normal, &c1.direction))?,
                    ],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if planes.windows(2).any(|w| w[0].d_spacing < w[1].d_spacing) {
            return Err(SansError::LogicError(
                "plane provider returned planes not sorted by descending d-spacing".to_string(),
            ));
        }

        let cry2lab = config.orientation.transpose();
        Ok(Self {
            planes,
            fractions: [c0.fraction, c1.fraction],
            axes: [cry2lab.apply(&c0.direction), cry2lab.apply(&c1.direction)],
            nodes: periodic_nodes(CONE_STEPS),
        })
    }

    pub fn describe(&self) -> String {
        format!(
            "{} planes, Bragg cutoff {:.4} Å, fractions {} / {}",
            self.planes.len(),
            self.bragg_cutoff(),
            self.fractions[0],
            self.fractions[1]
        )
    }

    pub fn plane_summaries(&self) -> Vec<PlaneSummary> {
        self.planes
            .iter()
            .map(|p| PlaneSummary {
                hkl: p.hkl,
                d_spacing: p.d_spacing,
                strength: p.strength,
            })
            .collect()
    }

    /// Bragg 截止波长 2·d_max (Å)
    pub fn bragg_cutoff(&self) -> f64 {
        self.planes.first().map(|p| 2.0 * p.d_spacing).unwrap_or(0.0)
    }

    /// 可散射晶面的 (下标, 权重)，权重不含 2λ²
    fn plane_weights(&self, wl: f64, direction: &Vec3) -> Vec<(usize, f64)> {
        let k_hat = normalize(direction).unwrap_or([0.0, 0.0, 1.0]);
        let (u, v) = orthonormal_basis(&k_hat);
        let proj = self.axes.map(|a| (dot(&a, &k_hat), dot(&a, &u), dot(&a, &v)));

        self.planes
            .iter()
            .enumerate()
            .take_while(|(_, p)| wl <= 2.0 * p.d_spacing)
            .map(|(i, p)| {
                let sin_theta = wl / (2.0 * p.d_spacing);
                let mixed: f64 = (0..2)
                    .map(|c| {
                        let (ak, au, av) = proj[c];
                        self.fractions[c]
                            * cone_average(&p.poles[c], &self.nodes, ak, au, av, sin_theta)
                    })
                    .sum();
                (i, p.strength * mixed)
            })
            .collect()
    }

    /// 截面 (barn)
    pub fn calc_cross_section(&self, ekin: f64, direction: &Vec3) -> f64 {
        let wl = ekin2wl(ekin);
        if !wl.is_finite() {
            return 0.0;
        }
        let sum: f64 = self
            .plane_weights(wl, direction)
            .iter()
            .map(|(_, w)| w)
            .sum();
        2.0 * wl * wl * sum
    }

    /// 选取散射晶面并给出弹性出射方向
    pub fn sample_scattering_event<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        ekin: f64,
        direction: &Vec3,
    ) -> Result<DirectedOutcome> {
        let unchanged = DirectedOutcome {
            ekin_final: ekin,
            mu: 1.0,
            direction: *direction,
        };

        let wl = ekin2wl(ekin);
        if !wl.is_finite() {
            return Ok(unchanged);
        }
        let weights = self.plane_weights(wl, direction);
        let values: Vec<f64> = weights.iter().map(|(_, w)| *w).collect();
        let Some(pick) = select_plane(&values, rng.gen::<f64>())? else {
            return Ok(unchanged);
        };

        let d = self.planes[weights[pick].0].d_spacing;
        let mu = (1.0 - wl * wl / (2.0 * d * d)).clamp(-1.0, 1.0);
        Ok(DirectedOutcome {
            ekin_final: ekin,
            mu,
            direction: rotate_direction(direction, mu, rng),
        })
    }
}

/// 累积权重选取：返回第一个累积值超过 r 的下标；总权重为 0 时返回 None。
/// 累积值必须单调不减且不超过 1，否则为内部错误。权重为 0 的晶面不会被选中。
pub fn select_plane(weights: &[f64], r: f64) -> Result<Option<usize>> {
    let total: f64 = weights.iter().sum();
    if total.is_nan() {
        return Err(SansError::LogicError(
            "plane weights contain NaN".to_string(),
        ));
    }
    if !(total > 0.0) {
        return Ok(None);
    }

    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        if !(*w >= 0.0) {
            return Err(SansError::LogicError(format!(
                "plane weight {} is negative or NaN: {}",
                i, w
            )));
        }
        let next = cumulative + w / total;
        if next < cumulative || next > 1.0 + CUMULATIVE_TOLERANCE {
            return Err(SansError::LogicError(format!(
                "cumulative plane weight {} is out of order (previous {})",
                next, cumulative
            )));
        }
        cumulative = next;
        if r < cumulative {
            return Ok(Some(i));
        }
    }

    Ok(weights.iter().rposition(|w| *w > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector::norm;
    use crate::models::{Atom, Crystal, Lattice};
    use crate::neutron::wl2ekin;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn aluminium() -> StdPlaneProvider {
        let a = 4.04958;
        StdPlaneProvider::new(Crystal::new(
            "Al",
            Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0),
            vec![
                Atom::new("Al", [0.0, 0.0, 0.0]),
                Atom::new("Al", [0.0, 0.5, 0.5]),
                Atom::new("Al", [0.5, 0.0, 0.5]),
                Atom::new("Al", [0.5, 0.5, 0.0]),
            ],
        ))
        .unwrap()
    }

    fn section(lines: &[&str]) -> CustomSection {
        lines
            .iter()
            .map(|l| l.split_whitespace().map(String::from).collect())
            .collect()
    }

    fn model(lines: &[&str]) -> CrystallineTexture {
        let config = TextureConfig::from_section(&section(lines)).unwrap();
        CrystallineTexture::new(&config, &aluminium(), 0.8).unwrap()
    }

    #[test]
    fn test_fraction_sum_must_be_one() {
        let err = TextureConfig::from_section(&section(&["1 0 0 0.8 0.3", "0 1 0 0.8 0.3"]))
            .unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("sum to 1"));
    }

    #[test]
    fn test_section_layout() {
        assert!(TextureConfig::from_section(&section(&["1 0 0 0.8 1.0"])).is_err());
        assert!(TextureConfig::from_section(&section(&["1 0 0 0.8", "0 1 0 0.8 0.5"])).is_err());
        assert!(TextureConfig::from_section(&section(&["0 0 0 0.8 0.5", "0 1 0 0.8 0.5"])).is_err());
        let c = TextureConfig::from_section(&section(&[
            "1 0 0 0.8 0.5",
            "0 1 0 0.8 0.5",
            "orientation 0 0 1 1 0 0 1 0 0 0 1 0",
        ]))
        .unwrap();
        assert_ne!(c.orientation, RotMatrix::identity());
    }

    #[test]
    fn test_untextured_matches_powder_formula() {
        let m = model(&["1 0 0 1.0 0.5", "0 1 0 1.0 0.5"]);
        let wl = 3.0;
        let ekin = wl2ekin(wl);

        let provider = aluminium();
        let info = provider.structure_info();
        let expected: f64 = provider
            .planes(0.8)
            .unwrap()
            .iter()
            .filter(|p| wl <= 2.0 * p.d_spacing)
            .map(|p| p.d_spacing * p.fsquared * 0.5 / (info.volume * info.n_atoms as f64))
            .sum::<f64>()
            * 2.0
            * wl
            * wl;

        for dir in [[0.0, 0.0, 1.0], [1.0, 1.0, 0.0], [0.3, -0.2, 0.9]] {
            let xs = m.calc_cross_section(ekin, &dir);
            assert!((xs - expected).abs() < 1e-12 * expected, "{} vs {}", xs, expected);
        }
    }

    #[test]
    fn test_bragg_cutoff() {
        let m = model(&["1 0 0 0.7 0.5", "0 1 0 0.7 0.5"]);
        let cutoff = m.bragg_cutoff();
        assert!((cutoff - 2.0 * 4.04958 / 3f64.sqrt()).abs() < 1e-9);
        let ekin = wl2ekin(cutoff * 1.01);
        assert_eq!(m.calc_cross_section(ekin, &[0.0, 0.0, 1.0]), 0.0);

        let mut rng = StdRng::seed_from_u64(1);
        let ev = m.sample_scattering_event(&mut rng, ekin, &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(ev.mu, 1.0);
        assert_eq!(ev.direction, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_symmetric_under_quarter_turn() {
        let m = model(&["1 0 0 0.6 0.5", "0 1 0 0.6 0.5"]);
        for wl in [1.7, 2.5, 4.0] {
            let ekin = wl2ekin(wl);
            for t in [0.0f64, 0.4, 1.1, 2.0] {
                let d1 = [t.cos(), t.sin(), 0.3];
                let d2 = [-t.sin(), t.cos(), 0.3];
                let x1 = m.calc_cross_section(ekin, &d1);
                let x2 = m.calc_cross_section(ekin, &d2);
                assert!(x1 > 0.0);
                assert!((x1 - x2).abs() < 1e-6 * x1, "wl {} t {}: {} vs {}", wl, t, x1, x2);
            }
        }
    }

    #[test]
    fn test_texture_is_anisotropic() {
        let m = model(&["0 0 1 0.4 0.5", "0 0 1 0.4 0.5"]);
        let ekin = wl2ekin(2.0);
        let along = m.calc_cross_section(ekin, &[0.0, 0.0, 1.0]);
        let across = m.calc_cross_section(ekin, &[1.0, 0.0, 0.0]);
        assert!((along - across).abs() > 1e-3 * along);
    }

    #[test]
    fn test_direction_average_recovers_powder() {
        // 球面方向平均后织构效应应抵消
        let textured = model(&["0 0 1 0.7 0.5", "1 0 0 0.7 0.5"]);
        let powder = model(&["0 0 1 1.0 0.5", "1 0 0 1.0 0.5"]);
        let ekin = wl2ekin(2.6);

        let n = 4000;
        let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let mut sum = 0.0;
        for i in 0..n {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - z * z).sqrt();
            let phi = golden * i as f64;
            sum += textured.calc_cross_section(ekin, &[r * phi.cos(), r * phi.sin(), z]);
        }
        let avg = sum / n as f64;
        let reference = powder.calc_cross_section(ekin, &[0.0, 0.0, 1.0]);
        assert!((avg / reference - 1.0).abs() < 1e-2, "{} vs {}", avg, reference);
    }

    #[test]
    fn test_sampled_event_is_bragg_scattering() {
        let m = model(&["1 0 0 0.6 0.5", "0 1 0 0.6 0.5"]);
        let wl = 2.2;
        let ekin = wl2ekin(wl);
        let allowed: Vec<f64> = m
            .plane_summaries()
            .iter()
            .filter(|p| wl <= 2.0 * p.d_spacing)
            .map(|p| 1.0 - wl * wl / (2.0 * p.d_spacing * p.d_spacing))
            .collect();
        assert!(!allowed.is_empty());

        let mut rng = StdRng::seed_from_u64(99);
        let dir = normalize(&[0.2, 0.5, 0.8]).unwrap();
        for _ in 0..200 {
            let ev = m.sample_scattering_event(&mut rng, ekin, &dir).unwrap();
            assert_eq!(ev.ekin_final, ekin);
            assert!((-1.0..=1.0).contains(&ev.mu));
            assert!(allowed.iter().any(|mu| (mu - ev.mu).abs() < 1e-12));
            assert!((norm(&ev.direction) - 1.0).abs() < 1e-9);
            assert!((dot(&ev.direction, &dir) - ev.mu).abs() < 1e-9);
        }
    }

    #[test]
    fn test_select_plane() {
        assert_eq!(select_plane(&[1.0, 1.0, 2.0], 0.1).unwrap(), Some(0));
        assert_eq!(select_plane(&[1.0, 1.0, 2.0], 0.3).unwrap(), Some(1));
        assert_eq!(select_plane(&[1.0, 1.0, 2.0], 0.99).unwrap(), Some(2));
        assert_eq!(select_plane(&[0.0, 0.0], 0.5).unwrap(), None);
        assert_eq!(select_plane(&[], 0.5).unwrap(), None);
    }

    #[test]
    fn test_select_plane_skips_zero_weights() {
        assert_eq!(select_plane(&[0.0, 1.0, 1.0], 0.0).unwrap(), Some(1));
        assert_eq!(select_plane(&[1.0, 0.0, 1.0, 0.0], 0.5).unwrap(), Some(2));
        // r 达到 1 时落在最后一个非零权重晶面
        assert_eq!(select_plane(&[1.0, 1.0, 0.0], 1.0).unwrap(), Some(1));
    }

    #[test]
    fn test_select_plane_detects_corrupt_weights() {
        let err = select_plane(&[1.0, -0.5, 1.0], 0.9).unwrap_err();
        assert!(err.is_logic_error());
        let err = select_plane(&[1.0, f64::NAN], 0.5).unwrap_err();
        assert!(err.is_logic_error());
    }
}
