//! # 中子相干散射长度数据库
//!
//! 天然同位素丰度下的束缚相干散射长度 b_coh，单位 fm。
//! 1 fm = 0.1 √barn，结构因子 |F|² 以 barn 计时使用 `coherent_length_sqrt_barn`。
//!
//! ## 数据来源
//! V. F. Sears, Neutron News 3 (1992) 26-37
//!
//! ## 依赖关系
//! - 被 `texture/planes.rs` 计算结构因子
//! - 被 `models/material.rs` 计算散射长度密度
//! - 纯静态数据，无外部依赖

use std::collections::HashMap;
use std::sync::LazyLock;

/// 元素 -> b_coh (fm)
pub static COHERENT_LENGTHS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    let table: [(&'static str, f64); 48] = [
        ("H", -3.739),
        ("D", 6.671),
        ("He", 3.26),
        ("Li", -1.90),
        ("Be", 7.79),
        ("B", 5.30),
        ("C", 6.646),
        ("N", 9.36),
        ("O", 5.803),
        ("F", 5.654),
        ("Na", 3.63),
        ("Mg", 5.375),
        ("Al", 3.449),
        ("Si", 4.1491),
        ("P", 5.13),
        ("S", 2.847),
        ("Cl", 9.577),
        ("K", 3.67),
        ("Ca", 4.70),
        ("Ti", -3.438),
        ("V", -0.3824),
        ("Cr", 3.635),
        ("Mn", -3.73),
        ("Fe", 9.45),
        ("Co", 2.49),
        ("Ni", 10.3),
        ("Cu", 7.718),
        ("Zn", 5.68),
        ("Ga", 7.288),
        ("Ge", 8.185),
        ("As", 6.58),
        ("Se", 7.970),
        ("Br", 6.795),
        ("Rb", 7.09),
        ("Sr", 7.02),
        ("Y", 7.75),
        ("Zr", 7.16),
        ("Nb", 7.054),
        ("Mo", 6.715),
        ("Ag", 5.922),
        ("Sn", 6.225),
        ("Ba", 5.07),
        ("La", 8.24),
        ("Ce", 4.84),
        ("W", 4.86),
        ("Au", 7.63),
        ("Pb", 9.405),
        ("Bi", 8.532),
    ];
    table.into_iter().collect()
});

/// 获取元素的相干散射长度 (fm)
pub fn coherent_length(element: &str) -> Option<f64> {
    if let Some(b) = COHERENT_LENGTHS.get(element) {
        return Some(*b);
    }

    // 处理 "Fe1"、"Al_a" 这类带后缀的标签
    let symbol: String = element
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect();
    if let Some(b) = COHERENT_LENGTHS.get(symbol.as_str()) {
        return Some(*b);
    }

    let first: String = symbol.chars().take(1).collect();
    COHERENT_LENGTHS.get(first.as_str()).copied()
}

/// 相干散射长度 (√barn)
pub fn coherent_length_sqrt_barn(element: &str) -> Option<f64> {
    coherent_length(element).map(|b| 0.1 * b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_elements() {
        assert_eq!(coherent_length("C"), Some(6.646));
        assert_eq!(coherent_length("Al"), Some(3.449));
        assert!(coherent_length("H").unwrap() < 0.0);
        assert!((coherent_length_sqrt_barn("Fe").unwrap() - 0.945).abs() < 1e-12);
    }

    #[test]
    fn test_labels() {
        assert_eq!(coherent_length("Fe1"), Some(9.45));
        assert_eq!(coherent_length("Si_a"), Some(4.1491));
        assert_eq!(coherent_length("Xx"), None);
    }
}
