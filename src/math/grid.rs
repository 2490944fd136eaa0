//! # 数值网格
//!
//! 线性与对数等比网格生成。
//!
//! ## 依赖关系
//! - 被 `sans/intensity.rs` 生成 Q 网格
//! - 被 `commands/` 生成波长扫描点

/// 线性等间距网格（含端点）
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            v[n - 1] = end;
            v
        }
    }
}

/// 等比网格（含端点），要求 start, end > 0
pub fn geomspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    debug_assert!(start > 0.0 && end > 0.0);
    let (l0, l1) = (start.ln(), end.ln());
    let mut v: Vec<f64> = linspace(l0, l1, n).into_iter().map(f64::exp).collect();
    if n > 1 {
        v[0] = start;
        v[n - 1] = end;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        let v = linspace(1.0, 2.0, 5);
        assert_eq!(v, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_geomspace_is_monotonic_with_exact_ends() {
        let v = geomspace(1e-6, 10.0, 1000);
        assert_eq!(v.len(), 1000);
        assert_eq!(v[0], 1e-6);
        assert_eq!(v[999], 10.0);
        assert!(v.windows(2).all(|w| w[0] < w[1]));
        let ratio = v[1] / v[0];
        assert!((v[501] / v[500] - ratio).abs() < 1e-9);
    }
}
