//! # 分段线性概率分布
//!
//! 由 (x, y) 点定义的分段线性密度，提供精确的累积分布与逆累积分布（百分位）。
//!
//! ## 算法
//! 每段内密度线性变化，段内累积为二次函数：
//! c(t) = y₀·t + ½·a·t²，a = (y₁ - y₀)/Δx
//! 反解采用数值稳定形式 t = 2r / (y₀ + √(y₀² + 2ar))
//!
//! ## 依赖关系
//! - 被 `sans/iofq.rs` 用于 Q 抽样
//! - 无外部模块依赖

use crate::error::{Result, SansError};

/// 分段线性分布
#[derive(Debug, Clone)]
pub struct PointwiseDist {
    x: Vec<f64>,
    y: Vec<f64>,
    /// 归一化累积分布，cdf[0] = 0，cdf[n-1] = 1
    cdf: Vec<f64>,
}

impl PointwiseDist {
    /// 由密度点构造；y 需有限且非负，积分需为正
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SansError::BadInput(format!(
                "distribution x and y have different size ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(SansError::BadInput(
                "distribution needs at least two points".to_string(),
            ));
        }
        if x.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(SansError::BadInput(
                "distribution x is not strictly ascending".to_string(),
            ));
        }
        if y.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SansError::BadInput(
                "distribution weights must be finite and non-negative".to_string(),
            ));
        }

        let mut cdf = Vec::with_capacity(x.len());
        cdf.push(0.0);
        let mut total = 0.0;
        for i in 1..x.len() {
            total += 0.5 * (x[i] - x[i - 1]) * (y[i] + y[i - 1]);
            cdf.push(total);
        }

        if !(total > 0.0) || !total.is_finite() {
            return Err(SansError::BadInput(
                "distribution has no positive weight".to_string(),
            ));
        }

        for c in cdf.iter_mut() {
            *c /= total;
        }
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Ok(Self { x, y, cdf })
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// 累积分布 P(X ≤ x)
    pub fn cdf_at(&self, x: f64) -> f64 {
        if x <= self.x_min() {
            return 0.0;
        }
        if x >= self.x_max() {
            return 1.0;
        }

        let i = self.x.partition_point(|&v| v <= x) - 1;
        let dx = self.x[i + 1] - self.x[i];
        let t = x - self.x[i];
        let slope = (self.y[i + 1] - self.y[i]) / dx;
        let seg_norm = (self.cdf[i + 1] - self.cdf[i])
            / (0.5 * dx * (self.y[i] + self.y[i + 1])).max(f64::MIN_POSITIVE);
        let partial = t * (self.y[i] + 0.5 * slope * t);

        (self.cdf[i] + partial * seg_norm).clamp(0.0, 1.0)
    }

    /// 逆累积分布：返回满足 P(X ≤ x) = p 的 x
    pub fn percentile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        let n = self.x.len();

        // 第一个 cdf[i+1] > p 的段
        let i = self.cdf[1..]
            .partition_point(|&c| c <= p)
            .min(n - 2);

        let dx = self.x[i + 1] - self.x[i];
        let seg_weight = self.cdf[i + 1] - self.cdf[i];
        if !(seg_weight > 0.0) {
            return self.x[i];
        }

        // 段内目标面积（未归一化单位）
        let seg_area = 0.5 * dx * (self.y[i] + self.y[i + 1]);
        let r = (p - self.cdf[i]) / seg_weight * seg_area;
        let y0 = self.y[i];
        let a = (self.y[i + 1] - y0) / dx;

        let denom = y0 + (y0 * y0 + 2.0 * a * r).max(0.0).sqrt();
        let t = if denom > 0.0 { 2.0 * r / denom } else { 0.0 };

        self.x[i] + t.clamp(0.0, dx)
    }
}
