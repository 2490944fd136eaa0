//! # sample 子命令实现
//!
//! 在固定波长下并行抽取散射事件，统计 μ 分布。
//!
//! ## 功能
//! - 事件按块分配，每块一个由 (seed + 块号) 确定的 `StdRng`，结果与线程数无关
//! - 校验弹性散射：出射能量等于入射能量，μ ∈ [-1, 1]
//! - 输出 μ 直方图 (PNG/SVG/CSV)
//!
//! ## 依赖关系
//! - 使用 `cli/sample.rs` 定义的 SampleArgs
//! - 使用 `scatter.rs`、`report/`
//! - 使用 `rayon` 并行，`indicatif` 显示进度

use crate::batch::BatchRunner;
use crate::cli::sample::SampleArgs;
use crate::cli::OutputFormat;
use crate::error::{Result, SansError};
use crate::math::vector::Vec3;
use crate::neutron::wl2ekin;
use crate::report::plot::{self, FigureOptions};
use crate::report::{export, MuHistogram, SampleSummary};
use crate::scatter::{ModelSettings, ScatterModel};
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::Path;

/// 每块事件数
const CHUNK_EVENTS: u64 = 10_000;

/// 执行抽样
pub fn execute(args: SampleArgs, data_dir: &Path) -> Result<()> {
    output::print_header("Scattering Event Sampling");

    if !(args.wavelength > 0.0) {
        return Err(SansError::InvalidArgument(format!(
            "wavelength must be positive, got {}",
            args.wavelength
        )));
    }

    let settings = ModelSettings {
        data_dir: data_dir.to_path_buf(),
        dmin: args.dmin,
        direction: args.direction,
    };
    let (info, model) = super::load_model(&args.input, &settings)?;
    output::print_success(&format!("Loaded '{}' with model {}", info.name, model.kind()));
    if let Some(crystal) = &info.crystal {
        output::print_info(&format!(
            "Structure: {} ({} atoms/cell)",
            crystal.formula(),
            crystal.atoms.len()
        ));
    }
    output::print_info(&model.describe());

    let ekin = wl2ekin(args.wavelength);
    let xs = model.calc_cross_section(ekin, &settings.direction);
    output::print_info(&format!(
        "λ = {:.4} Å, E = {:.4} meV, σ = {:.6e} barn",
        args.wavelength,
        ekin * 1000.0,
        xs
    ));

    let runner = BatchRunner::new(args.jobs)?;
    let pb = progress::create_progress_bar(args.events, "Sampling");
    let histogram = runner.install(|| {
        sample_events(
            &model,
            ekin,
            &settings.direction,
            args.events,
            args.seed,
            args.bins,
            Some(&pb),
        )
    });
    pb.finish_and_clear();
    let (histogram, mean_mu) = histogram?;

    let summary = SampleSummary {
        material: info.name.clone(),
        model: model.kind().to_string(),
        wavelength: args.wavelength,
        n_events: histogram.total(),
        mean_mu,
        histogram,
    };
    output::print_success(&format!(
        "{} events, <μ> = {:.6}, all elastic",
        summary.n_events, summary.mean_mu
    ));

    if let Some(path) = &args.output {
        let format = args.format.unwrap_or_else(|| OutputFormat::guess(path));
        match format {
            OutputFormat::Csv => export::histogram_to_csv(&summary.histogram, path)?,
            OutputFormat::Png | OutputFormat::Svg => plot::generate_mu_plot(
                &summary.histogram,
                path,
                &format!("{} ({}), λ = {} Å", summary.material, summary.model, summary.wavelength),
                FigureOptions {
                    width: 1200,
                    height: 800,
                    use_svg: format == OutputFormat::Svg,
                },
            )?,
        }
        output::print_success(&format!("Histogram saved to '{}'", path.display()));
    }

    Ok(())
}

/// 并行抽样，返回 μ 直方图与平均 μ
pub fn sample_events(
    model: &ScatterModel,
    ekin: f64,
    direction: &Vec3,
    n_events: u64,
    seed: u64,
    n_bins: usize,
    pb: Option<&ProgressBar>,
) -> Result<(MuHistogram, f64)> {
    let n_chunks = n_events.div_ceil(CHUNK_EVENTS);

    let chunks: Vec<(MuHistogram, f64)> = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_EVENTS;
            let count = CHUNK_EVENTS.min(n_events - start);
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk));
            let mut histogram = MuHistogram::new(n_bins);
            let mut mu_sum = 0.0;

            for _ in 0..count {
                let ev = model.sample_scattering_event(&mut rng, ekin, direction)?;
                if ev.ekin_final != ekin || !(-1.0..=1.0).contains(&ev.mu) {
                    return Err(SansError::LogicError(format!(
                        "non-elastic or out-of-range event: E {} -> {}, mu {}",
                        ekin, ev.ekin_final, ev.mu
                    )));
                }
                histogram.fill(ev.mu);
                mu_sum += ev.mu;
            }

            if let Some(pb) = pb {
                pb.inc(count);
            }
            Ok((histogram, mu_sum))
        })
        .collect::<Result<_>>()?;

    let mut total = MuHistogram::new(n_bins);
    let mut mu_sum = 0.0;
    for (h, s) in &chunks {
        total.merge(h)?;
        mu_sum += s;
    }
    let mean = if total.total() > 0 {
        mu_sum / total.total() as f64
    } else {
        0.0
    };

    Ok((total, mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomSection;
    use crate::sans::IsotropicSans;

    fn flat_model() -> ScatterModel {
        let section: CustomSection = ["DirectLoad", "Q 0.001 0.5 5.0", "I 1 1 1"]
            .iter()
            .map(|l| l.split_whitespace().map(String::from).collect())
            .collect();
        ScatterModel::Isotropic(IsotropicSans::from_section(&section, None).unwrap())
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let model = flat_model();
        let ekin = wl2ekin(3.0);
        let z = [0.0, 0.0, 1.0];
        let (h1, m1) = sample_events(&model, ekin, &z, 25_000, 7, 50, None).unwrap();
        let (h2, m2) = sample_events(&model, ekin, &z, 25_000, 7, 50, None).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(m1, m2);
        assert_eq!(h1.total(), 25_000);
    }

    #[test]
    fn test_flat_intensity_mean_mu() {
        // 常数 I(Q)：Q² 在 [0, 4k²] 上均匀，μ 在 [-1, 1] 上均匀
        let model = flat_model();
        let ekin = wl2ekin(3.0);
        let (_, mean) = sample_events(&model, ekin, &[0.0, 0.0, 1.0], 40_000, 1, 20, None).unwrap();
        assert!(mean.abs() < 0.02, "mean mu = {}", mean);
    }

    #[test]
    fn test_zero_events() {
        let (h, mean) =
            sample_events(&flat_model(), wl2ekin(3.0), &[0.0, 0.0, 1.0], 0, 1, 10, None).unwrap();
        assert_eq!(h.total(), 0);
        assert_eq!(mean, 0.0);
    }
}
