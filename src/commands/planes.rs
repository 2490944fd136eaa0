//! # planes 子命令实现
//!
//! 列出织构模型使用的晶面：(hkl)、d 间距、强度因子 d·|F|²·0.5/(V·N)。
//!
//! ## 依赖关系
//! - 使用 `cli/planes.rs` 定义的 PlanesArgs
//! - 使用 `texture/` 构造模型
//! - 使用 `report/export.rs` 导出 CSV

use crate::cli::planes::PlanesArgs;
use crate::error::Result;
use crate::parsers;
use crate::report::export;
use crate::texture::model::PlaneSummary;
use crate::texture::CrystallineTexture;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 执行晶面列表
pub fn execute(args: PlanesArgs) -> Result<()> {
    output::print_header("Texture Bragg Planes");

    let info = parsers::parse_material_file(&args.input)?;
    let model = CrystallineTexture::from_material(&info, args.dmin)?;
    let planes = model.plane_summaries();

    output::print_success(&format!(
        "{}: {} planes with d >= {} Å, Bragg cutoff {:.4} Å",
        info.name,
        planes.len(),
        args.dmin,
        model.bragg_cutoff()
    ));

    print_plane_table(&planes, args.show);

    if let Some(path) = &args.output {
        export::planes_to_csv(&planes, path)?;
        output::print_success(&format!("Plane list saved to '{}'", path.display()));
    }

    Ok(())
}

fn print_plane_table(planes: &[PlaneSummary], count: usize) {
    #[derive(Tabled)]
    struct PlaneRow {
        #[tabled(rename = "(hkl)")]
        hkl: String,
        #[tabled(rename = "d (Å)")]
        d_spacing: String,
        #[tabled(rename = "2d (Å)")]
        cutoff: String,
        #[tabled(rename = "Strength (barn/Å²)")]
        strength: String,
    }

    let rows: Vec<PlaneRow> = planes
        .iter()
        .take(count)
        .map(|p| PlaneRow {
            hkl: format!("({} {} {})", p.hkl[0], p.hkl[1], p.hkl[2]),
            d_spacing: format!("{:.4}", p.d_spacing),
            cutoff: format!("{:.4}", 2.0 * p.d_spacing),
            strength: format!("{:.6e}", p.strength),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("Top {} planes", rows.len()));
        println!("{}", Table::new(&rows));
    }
}
