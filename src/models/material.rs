//! # 材料信息
//!
//! 材料文件解析后的统一表示：晶体结构、原子数密度以及 `@CUSTOM_<NAME>` 配置段。
//! 各散射模型只通过这里的接口读取配置和密度。
//!
//! ## 依赖关系
//! - 由 `parsers/ncmat.rs` 构造
//! - 被 `scatter.rs`、`sans/`、`texture/` 使用
//! - 使用 `texture/scatlen.rs` 的相干散射长度

use crate::error::{Result, SansError};
use crate::models::Crystal;
use crate::texture::scatlen;

/// 配置段：每行一个 token 列表
pub type CustomSection = Vec<Vec<String>>;

/// 原子数密度与相干散射长度密度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringDensity {
    /// 原子数密度 (atoms/Å³)
    pub number_density: f64,
    /// 相干散射长度密度 (√barn/Å³)
    pub sld: f64,
}

impl ScatteringDensity {
    /// 金刚石：n = 0.17715 atoms/Å³，b_C = 6.646 fm
    pub fn diamond() -> Self {
        let number_density = 0.177_147_166_666_666_7;
        ScatteringDensity {
            number_density,
            sld: number_density * 0.6646,
        }
    }
}

/// 材料信息
#[derive(Debug, Clone, Default)]
pub struct MaterialInfo {
    /// 材料名称（通常为文件名）
    pub name: String,
    /// 晶体结构
    pub crystal: Option<Crystal>,
    /// 显式给定的原子数密度 (atoms/Å³)
    pub density: Option<f64>,
    /// 按出现顺序保存的配置段
    custom_sections: Vec<(String, CustomSection)>,
}

impl MaterialInfo {
    pub fn new(name: impl Into<String>) -> Self {
        MaterialInfo {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_custom_section(&mut self, name: impl Into<String>, data: CustomSection) {
        self.custom_sections.push((name.into(), data));
    }

    /// 指定名称的配置段数量
    pub fn count_custom_sections(&self, name: &str) -> usize {
        self.custom_sections
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .count()
    }

    /// 按名称获取唯一的配置段
    pub fn get_custom_section(&self, name: &str) -> Result<&CustomSection> {
        match self.count_custom_sections(name) {
            0 => Err(SansError::BadInput(format!(
                "Material '{}' has no @CUSTOM_{} section",
                self.name, name
            ))),
            1 => self
                .custom_sections
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, data)| data)
                .ok_or_else(|| SansError::LogicError("custom section vanished".to_string())),
            n => Err(SansError::BadInput(format!(
                "Multiple @CUSTOM_{} sections are not allowed ({} found in '{}')",
                name, n, self.name
            ))),
        }
    }

    /// 所有配置段名称
    pub fn custom_section_names(&self) -> Vec<&str> {
        self.custom_sections.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// 晶体结构，缺失时报错
    pub fn crystal(&self) -> Result<&Crystal> {
        self.crystal.as_ref().ok_or_else(|| {
            SansError::BadInput(format!(
                "Material '{}' has no @CELL/@ATOMPOSITIONS structure",
                self.name
            ))
        })
    }

    /// 原子数密度：优先 @DENSITY，否则由晶胞计算
    pub fn number_density(&self) -> Option<f64> {
        if let Some(d) = self.density {
            return Some(d);
        }
        let per_atom = self.crystal.as_ref()?.volume_per_atom()?;
        (per_atom > 0.0).then(|| 1.0 / per_atom)
    }

    /// 相干散射长度密度 ρ = n·<b>
    pub fn scattering_density(&self) -> Result<ScatteringDensity> {
        let crystal = self.crystal()?;
        if crystal.atoms.is_empty() {
            return Err(SansError::BadInput(format!(
                "Material '{}' lists no atoms",
                self.name
            )));
        }

        let mut total_b = 0.0;
        for atom in &crystal.atoms {
            total_b += scatlen::coherent_length_sqrt_barn(&atom.element).ok_or_else(|| {
                SansError::BadInput(format!(
                    "No coherent scattering length known for element '{}'",
                    atom.element
                ))
            })?;
        }
        let mean_b = total_b / crystal.atoms.len() as f64;

        let number_density = self.number_density().ok_or_else(|| {
            SansError::BadInput(format!(
                "Cannot determine number density of material '{}'",
                self.name
            ))
        })?;

        Ok(ScatteringDensity {
            number_density,
            sld: number_density * mean_b,
        })
    }
}
