//! # 散射模型选择
//!
//! 根据材料文件中出现的 `@CUSTOM_` 段选择唯一激活的散射模型：
//! - `SANSND`: 稀释 SANS（FILE / PPF / GPF / HSFBA）
//! - `SANSISO`: 各向同性 I(Q)
//! - `CRYSTEXT`: 晶体织构
//!
//! 三者恰好出现一个，否则报错。
//!
//! ## 依赖关系
//! - 使用 `sans/`、`texture/`
//! - 被 `commands/` 使用

use crate::error::{Result, SansError};
use crate::math::vector::{rotate_direction, Vec3};
use crate::models::MaterialInfo;
use crate::neutron::DirectedOutcome;
use crate::sans::isotropic::SANSISO_SECTION;
use crate::sans::model::SANSND_SECTION;
use crate::sans::{IsotropicSans, SansModel};
use crate::texture::model::CRYSTEXT_SECTION;
use crate::texture::CrystallineTexture;

use rand::Rng;
use std::fmt;
use std::path::PathBuf;

/// 默认最小 d 间距 (Å)
pub const DEFAULT_DMIN: f64 = 0.5;

/// 模型构造设置
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// FILE / HSFBA 数据文件目录
    pub data_dir: PathBuf,
    /// 晶面列表的最小 d 间距 (Å)
    pub dmin: f64,
    /// 入射方向（实验室系）
    pub direction: Vec3,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dmin: DEFAULT_DMIN,
            direction: [0.0, 0.0, 1.0],
        }
    }
}

/// 模型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Sansnd,
    Sansiso,
    Crystext,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Sansnd, ModelKind::Sansiso, ModelKind::Crystext];

    pub fn section_name(&self) -> &'static str {
        match self {
            ModelKind::Sansnd => SANSND_SECTION,
            ModelKind::Sansiso => SANSISO_SECTION,
            ModelKind::Crystext => CRYSTEXT_SECTION,
        }
    }

    /// 材料文件中激活的唯一模型
    pub fn detect(info: &MaterialInfo) -> Result<Self> {
        let present: Vec<ModelKind> = Self::ALL
            .into_iter()
            .filter(|k| info.count_custom_sections(k.section_name()) > 0)
            .collect();

        match present.as_slice() {
            [kind] => Ok(*kind),
            [] => Err(SansError::BadInput(format!(
                "Material '{}' has none of the @CUSTOM_SANSND, @CUSTOM_SANSISO, \
                 @CUSTOM_CRYSTEXT sections (found: [{}])",
                info.name,
                info.custom_section_names().join(", ")
            ))),
            many => Err(SansError::BadInput(format!(
                "Material '{}' activates more than one model: {}",
                info.name,
                many.iter()
                    .map(|k| k.section_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section_name())
    }
}

/// 激活的散射模型
#[derive(Debug, Clone)]
pub enum ScatterModel {
    Sans(SansModel),
    Isotropic(IsotropicSans),
    Texture(CrystallineTexture),
}

impl ScatterModel {
    pub fn from_material(info: &MaterialInfo, settings: &ModelSettings) -> Result<Self> {
        match ModelKind::detect(info)? {
            ModelKind::Sansnd => Ok(ScatterModel::Sans(SansModel::from_material(
                info,
                &settings.data_dir,
            )?)),
            ModelKind::Sansiso => Ok(ScatterModel::Isotropic(IsotropicSans::from_material(info)?)),
            ModelKind::Crystext => Ok(ScatterModel::Texture(CrystallineTexture::from_material(
                info,
                settings.dmin,
            )?)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ScatterModel::Sans(_) => ModelKind::Sansnd,
            ScatterModel::Isotropic(_) => ModelKind::Sansiso,
            ScatterModel::Texture(_) => ModelKind::Crystext,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScatterModel::Sans(m) => m.describe(),
            ScatterModel::Isotropic(m) => m.describe(),
            ScatterModel::Texture(m) => m.describe(),
        }
    }

    /// 是否依赖入射方向
    pub fn is_oriented(&self) -> bool {
        matches!(self, ScatterModel::Texture(_))
    }

    /// 截面 (barn)；各向同性模型忽略方向
    pub fn calc_cross_section(&self, ekin: f64, direction: &Vec3) -> f64 {
        match self {
            ScatterModel::Sans(m) => m.calc_cross_section(ekin),
            ScatterModel::Isotropic(m) => m.calc_cross_section(ekin),
            ScatterModel::Texture(m) => m.calc_cross_section(ekin, direction),
        }
    }

    /// 抽取一次散射；各向同性模型的出射方向绕入射方向均匀取方位角
    pub fn sample_scattering_event<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        ekin: f64,
        direction: &Vec3,
    ) -> Result<DirectedOutcome> {
        let outcome = match self {
            ScatterModel::Sans(m) => m.sample_scattering_event(rng, ekin),
            ScatterModel::Isotropic(m) => m.sample_scattering_event(rng, ekin),
            ScatterModel::Texture(m) => return m.sample_scattering_event(rng, ekin, direction),
        };
        Ok(DirectedOutcome {
            ekin_final: outcome.ekin_final,
            mu: outcome.mu,
            direction: rotate_direction(direction, outcome.mu, rng),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector::dot;
    use crate::neutron::wl2ekin;
    use crate::parsers::ncmat::parse_ncmat_content;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PPF_MATERIAL: &str = "NCMAT v7
@CELL
  cubic 3.567
@ATOMPOSITIONS
  C 0 0 0
  C 1/2 1/2 0
  C 1/2 0 1/2
  C 0 1/2 1/2
  C 1/4 1/4 1/4
  C 3/4 3/4 1/4
  C 3/4 1/4 3/4
  C 1/4 3/4 3/4
@CUSTOM_SANSND
  2.0
  PPF
  132.869 1.33605 0.0519763 3.97314 0.0510821 1
";

    const TEXTURE_MATERIAL: &str = "NCMAT v7
@CELL
  cubic 4.04958
@ATOMPOSITIONS
  Al 0 0 0
  Al 0 1/2 1/2
  Al 1/2 0 1/2
  Al 1/2 1/2 0
@CUSTOM_CRYSTEXT
  1 0 0 0.7 0.5
  0 1 0 0.7 0.5
";

    #[test]
    fn test_detect_single_model() {
        let info = parse_ncmat_content(PPF_MATERIAL, "diamond").unwrap();
        assert_eq!(ModelKind::detect(&info).unwrap(), ModelKind::Sansnd);

        let info = parse_ncmat_content(TEXTURE_MATERIAL, "Al").unwrap();
        assert_eq!(ModelKind::detect(&info).unwrap(), ModelKind::Crystext);
    }

    #[test]
    fn test_detect_rejects_none_or_many() {
        let none = parse_ncmat_content("NCMAT v7\n@CELL\n cubic 3\n", "x").unwrap();
        assert!(ModelKind::detect(&none).unwrap_err().is_bad_input());

        let both = format!("{}@CUSTOM_SANSISO\n  HardSphere\n  radius 20\n", PPF_MATERIAL);
        let info = parse_ncmat_content(&both, "x").unwrap();
        let err = ModelKind::detect(&info).unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }

    #[test]
    fn test_sans_model_through_material() {
        let info = parse_ncmat_content(PPF_MATERIAL, "diamond").unwrap();
        let model = ScatterModel::from_material(&info, &ModelSettings::default()).unwrap();
        assert_eq!(model.kind(), ModelKind::Sansnd);
        assert!(!model.is_oriented());

        let ekin = wl2ekin(4.0);
        let z = [0.0, 0.0, 1.0];
        let xs = model.calc_cross_section(ekin, &z);
        assert!(xs > 0.0);
        assert_eq!(xs, model.calc_cross_section(ekin, &[1.0, 0.0, 0.0]));

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let ev = model.sample_scattering_event(&mut rng, ekin, &z).unwrap();
            assert_eq!(ev.ekin_final, ekin);
            assert!((dot(&ev.direction, &z) - ev.mu).abs() < 1e-9);
        }
    }

    #[test]
    fn test_texture_model_through_material() {
        let info = parse_ncmat_content(TEXTURE_MATERIAL, "Al").unwrap();
        let settings = ModelSettings {
            dmin: 0.8,
            ..Default::default()
        };
        let model = ScatterModel::from_material(&info, &settings).unwrap();
        assert!(model.is_oriented());
        let xs = model.calc_cross_section(wl2ekin(3.0), &[0.0, 0.6, 0.8]);
        assert!(xs > 0.0);
    }
}
