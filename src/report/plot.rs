//! # 图表生成
//!
//! 使用 `plotters` 绘制截面曲线 σ(λ) 与 μ 分布直方图。
//!
//! ## 功能
//! - 支持 PNG 和 SVG 输出
//! - 多条曲线共用坐标轴（批量模式下每个材料一条）
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `report/mod.rs` 的 XsCurve, MuHistogram

use crate::error::{Result, SansError};
use crate::report::{MuHistogram, XsCurve};

use plotters::prelude::*;
use std::path::Path;

const PALETTE: [RGBColor; 5] = [
    RGBColor(0, 102, 204),
    RGBColor(204, 51, 0),
    RGBColor(0, 153, 76),
    RGBColor(153, 51, 153),
    RGBColor(230, 138, 0),
];

/// 图像尺寸与格式
#[derive(Debug, Clone, Copy)]
pub struct FigureOptions {
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

fn plot_error<E: std::fmt::Debug>(e: E) -> SansError {
    SansError::Other(format!("{:?}", e))
}

/// 绘制截面曲线
pub fn generate_xs_plot(
    curves: &[XsCurve],
    output_path: &Path,
    title: &str,
    options: FigureOptions,
) -> Result<()> {
    if options.use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_xs_chart(&root, curves, title)?;
        root.present().map_err(plot_error)?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_xs_chart(&root, curves, title)?;
        root.present().map_err(plot_error)?;
    }
    Ok(())
}

fn draw_xs_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &[XsCurve],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let (x_min, x_max) = curves
        .iter()
        .flat_map(|c| c.points.iter())
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), p| {
            (lo.min(p.wavelength), hi.max(p.wavelength))
        });
    if !x_min.is_finite() {
        return Err(SansError::InvalidArgument("nothing to plot".to_string()));
    }
    let y_max = curves.iter().map(XsCurve::max_xs).fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0.0..y_top)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (Å)")
        .y_desc("Cross section (barn)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    for (i, curve) in curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().map(|p| (p.wavelength, p.xs)),
                color.stroke_width(2),
            ))
            .map_err(plot_error)?
            .label(format!("{} ({})", curve.material, curve.model))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if curves.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 14))
            .draw()
            .map_err(plot_error)?;
    }

    Ok(())
}

/// 绘制 μ 直方图
pub fn generate_mu_plot(
    histogram: &MuHistogram,
    output_path: &Path,
    title: &str,
    options: FigureOptions,
) -> Result<()> {
    if options.use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_mu_chart(&root, histogram, title)?;
        root.present().map_err(plot_error)?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_mu_chart(&root, histogram, title)?;
        root.present().map_err(plot_error)?;
    }
    Ok(())
}

fn draw_mu_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    histogram: &MuHistogram,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let bins = histogram.bins();
    let y_max = bins.iter().map(|b| b.density).fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-1.0..1.0, 0.0..y_top)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("μ = cos θ")
        .y_desc("Probability density")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let fill_color = PALETTE[0].mix(0.6);
    chart
        .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
            Rectangle::new([(b.mu_low, 0.0), (b.mu_high, b.density)], fill_color.filled())
        }))
        .map_err(plot_error)?;

    Ok(())
}
