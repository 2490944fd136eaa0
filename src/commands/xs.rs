//! # xs 子命令实现
//!
//! 计算材料截面随波长的变化。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行计算（rayon）
//! - 输出图像 (PNG/SVG) 或数据文件 (CSV)
//!
//! ## 依赖关系
//! - 使用 `cli/xs.rs` 定义的 XsArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `report/` 模块输出

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::xs::XsArgs;
use crate::cli::OutputFormat;
use crate::error::{Result, SansError};
use crate::report::plot::{self, FigureOptions};
use crate::report::{export, XsCurve};
use crate::scatter::ModelSettings;
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 执行截面计算
pub fn execute(args: XsArgs, data_dir: &Path) -> Result<()> {
    output::print_header("Neutron Cross Section");

    let settings = ModelSettings {
        data_dir: data_dir.to_path_buf(),
        dmin: args.dmin,
        direction: args.direction,
    };

    if args.input.is_file() {
        execute_single_file(&args, &settings)
    } else if args.input.is_dir() {
        execute_batch(&args, &settings)
    } else {
        Err(SansError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &XsArgs, settings: &ModelSettings) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let wl_range = parse_range(&args.wl_range)?;
    let (info, model) = super::load_model(&args.input, settings)?;
    output::print_success(&format!("Loaded '{}' with model {}", info.name, model.kind()));
    if let Some(crystal) = &info.crystal {
        output::print_info(&format!(
            "Structure: {} ({} atoms/cell)",
            crystal.formula(),
            crystal.atoms.len()
        ));
    }
    output::print_info(&model.describe());
    if model.is_oriented() {
        let d = settings.direction;
        output::print_info(&format!("Incident direction: ({}, {}, {})", d[0], d[1], d[2]));
    }

    let curve = XsCurve::compute(&model, &info.name, wl_range, args.points, settings.direction)?;
    print_xs_table(&curve, args.show);

    let format = args.format.unwrap_or_else(|| OutputFormat::guess(&args.output));
    let title = args.title.clone().unwrap_or_else(|| info.name.clone());
    write_curve(&curve, &args.output, format, &title, args)?;

    output::print_success(&format!("Cross section saved to '{}'", args.output.display()));
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &XsArgs, settings: &ModelSettings) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} material files", files.len()));

    fs::create_dir_all(&args.output).map_err(|e| SansError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let wl_range = parse_range(&args.wl_range)?;
    let format = args.format.unwrap_or(OutputFormat::Png);
    output::print_info(&format!("Output format: {:?}", format));

    let runner = BatchRunner::new(args.jobs)?;
    let result = runner.run(files, |file| {
        process_batch_file(file, args, settings, wl_range, format)
    });

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 处理批量模式中的单个文件
fn process_batch_file(
    input: &PathBuf,
    args: &XsArgs,
    settings: &ModelSettings,
    wl_range: (f64, f64),
    format: OutputFormat,
) -> ProcessResult {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_file = args
        .output
        .join(format!("{}_xs.{}", stem, format.extension()));

    if output_file.exists() && !args.overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_file.display()
        ));
    }

    let run = || -> Result<()> {
        let (info, model) = super::load_model(input, settings)?;
        let curve =
            XsCurve::compute(&model, &info.name, wl_range, args.points, settings.direction)?;
        write_curve(&curve, &output_file, format, &info.name, args)
    };

    match run() {
        Ok(()) => {
            ProcessResult::Success(format!("{} -> {}", input.display(), output_file.display()))
        }
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

fn write_curve(
    curve: &XsCurve,
    path: &Path,
    format: OutputFormat,
    title: &str,
    args: &XsArgs,
) -> Result<()> {
    match format {
        OutputFormat::Csv => export::xs_to_csv(curve, path),
        OutputFormat::Png | OutputFormat::Svg => plot::generate_xs_plot(
            std::slice::from_ref(curve),
            path,
            title,
            FigureOptions {
                width: args.width,
                height: args.height,
                use_svg: format == OutputFormat::Svg,
            },
        ),
    }
}

/// 解析波长范围 "min-max"
fn parse_range(range: &str) -> Result<(f64, f64)> {
    let (lo, hi) = range
        .split_once('-')
        .ok_or_else(|| SansError::InvalidRange(range.to_string()))?;

    let min: f64 = lo
        .trim()
        .parse()
        .map_err(|_| SansError::InvalidRange(range.to_string()))?;
    let max: f64 = hi
        .trim()
        .parse()
        .map_err(|_| SansError::InvalidRange(range.to_string()))?;

    if !(min > 0.0) || max <= min {
        return Err(SansError::InvalidRange(format!(
            "{} (must be 0 < min < max)",
            range
        )));
    }

    Ok((min, max))
}

/// 打印截面表格（均匀抽取若干行）
fn print_xs_table(curve: &XsCurve, count: usize) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct XsRow {
        #[tabled(rename = "λ (Å)")]
        wavelength: String,
        #[tabled(rename = "E (meV)")]
        ekin: String,
        #[tabled(rename = "σ (barn)")]
        xs: String,
    }

    if count == 0 || curve.points.is_empty() {
        return;
    }
    let stride = curve.points.len().div_ceil(count).max(1);
    let rows: Vec<XsRow> = curve
        .points
        .iter()
        .step_by(stride)
        .map(|p| XsRow {
            wavelength: format!("{:.3}", p.wavelength),
            ekin: format!("{:.4}", p.ekin * 1000.0),
            xs: format!("{:.6e}", p.xs),
        })
        .collect();

    output::print_header(&format!("{} ({})", curve.material, curve.model));
    println!("{}", Table::new(&rows));
}
