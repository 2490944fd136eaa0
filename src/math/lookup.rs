//! # 线性插值查找表
//!
//! 单调 x 上的分段线性插值表，表外按选定的外推策略取值。
//!
//! ## 外推策略
//! 每个策略由 (下侧, 上侧) 两个独立的尾部函数组成：
//! - 零: 0
//! - 常数: 边界值
//! - 1/x: f_b · (x_b / x)
//! - 1/√x: f_b · √(x_b / x)
//!
//! ## 依赖关系
//! - 被 `sans/iofq.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, SansError};

/// 表外外推策略（下侧_上侧）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolate {
    #[default]
    ConstZero,
    ZeroZero,
    ZeroConst,
    OverXZero,
    OverSqrtXZero,
    OverSqrtXOverSqrtX,
    ConstOverSqrtX,
}

/// 单侧尾部函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    Zero,
    Const,
    OverX,
    OverSqrtX,
}

impl Extrapolate {
    fn tails(self) -> (Tail, Tail) {
        match self {
            Extrapolate::ConstZero => (Tail::Const, Tail::Zero),
            Extrapolate::ZeroZero => (Tail::Zero, Tail::Zero),
            Extrapolate::ZeroConst => (Tail::Zero, Tail::Const),
            Extrapolate::OverXZero => (Tail::OverX, Tail::Zero),
            Extrapolate::OverSqrtXZero => (Tail::OverSqrtX, Tail::Zero),
            Extrapolate::OverSqrtXOverSqrtX => (Tail::OverSqrtX, Tail::OverSqrtX),
            Extrapolate::ConstOverSqrtX => (Tail::Const, Tail::OverSqrtX),
        }
    }
}

impl Tail {
    /// 以边界点 (xb, fb) 计算尾部取值；x ≤ 0 时按边界值处理
    fn eval(self, x: f64, xb: f64, fb: f64) -> f64 {
        match self {
            Tail::Zero => 0.0,
            Tail::Const => fb,
            Tail::OverX => {
                if x <= 0.0 {
                    fb
                } else {
                    fb * xb / x
                }
            }
            Tail::OverSqrtX => {
                if x <= 0.0 {
                    fb
                } else {
                    fb * (xb / x).sqrt()
                }
            }
        }
    }
}

/// 线性插值查找表
#[derive(Debug, Clone)]
pub struct LookUpTable {
    x: Vec<f64>,
    f: Vec<f64>,
    lower: Tail,
    upper: Tail,
}

impl LookUpTable {
    /// 构造并校验：等长、非空、无 NaN、x 严格递增
    pub fn new(x: Vec<f64>, f: Vec<f64>, extrapolate: Extrapolate) -> Result<Self> {
        if x.len() != f.len() {
            return Err(SansError::BadInput(format!(
                "x and f have different size ({} vs {})",
                x.len(),
                f.len()
            )));
        }
        if x.is_empty() {
            return Err(SansError::BadInput("empty input array".to_string()));
        }
        if x.iter().chain(f.iter()).any(|v| v.is_nan()) {
            return Err(SansError::BadInput("table contains NaN".to_string()));
        }
        if x.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(SansError::BadInput(
                "x is not sorted in strictly ascending order".to_string(),
            ));
        }

        let (lower, upper) = extrapolate.tails();
        Ok(Self { x, f, lower, upper })
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// 查表：区间内线性插值，区间外按外推策略
    pub fn get(&self, x: f64) -> f64 {
        debug_assert!(!x.is_nan());

        let n = self.x.len();
        let idx = self.x.partition_point(|&v| v < x);

        if idx == 0 {
            if x == self.x[0] {
                return self.f[0];
            }
            return self.lower.eval(x, self.x[0], self.f[0]);
        }
        if idx == n {
            return self.upper.eval(x, self.x[n - 1], self.f[n - 1]);
        }

        let (x0, x1) = (self.x[idx - 1], self.x[idx]);
        let (f0, f1) = (self.f[idx - 1], self.f[idx]);
        f0 + (x - x0) * (f1 - f0) / (x1 - x0)
    }
}
