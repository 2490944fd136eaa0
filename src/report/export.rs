//! # 数据导出
//!
//! 截面曲线、μ 直方图与晶面列表导出为 CSV。
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `csv` + `serde` 写入

use crate::error::{Result, SansError};
use crate::report::{MuHistogram, XsCurve};
use crate::texture::model::PlaneSummary;

use serde::Serialize;
use std::path::Path;

/// 导出截面曲线
pub fn xs_to_csv(curve: &XsCurve, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for point in &curve.points {
        wtr.serialize(point)?;
    }
    flush(wtr, output_path)
}

/// 导出 μ 直方图
pub fn histogram_to_csv(histogram: &MuHistogram, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for bin in histogram.bins() {
        wtr.serialize(bin)?;
    }
    flush(wtr, output_path)
}

#[derive(Serialize)]
struct PlaneRecord {
    h: i32,
    k: i32,
    l: i32,
    d_spacing: f64,
    strength: f64,
}

/// 导出晶面列表
pub fn planes_to_csv(planes: &[PlaneSummary], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for p in planes {
        wtr.serialize(PlaneRecord {
            h: p.hkl[0],
            k: p.hkl[1],
            l: p.hkl[2],
            d_spacing: p.d_spacing,
            strength: p.strength,
        })?;
    }
    flush(wtr, output_path)
}

fn flush(mut wtr: csv::Writer<std::fs::File>, output_path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| SansError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}
