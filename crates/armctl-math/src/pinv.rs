//! 阻尼伪逆
//!
//! 对雅可比转置做 SVD，并对每个奇异值使用阻尼倒数 `σ / (σ² + λ²)`。
//! 雅可比接近奇异时，`λ` 限制了伪逆的幅值，数值异常不会传播到力矩输出。

use crate::{Matrix6x7, Matrix7x6};
use nalgebra::Matrix6;

/// 默认阻尼系数 λ
pub const DEFAULT_PINV_DAMPING: f64 = 0.2;

/// 计算 7×6 矩阵的阻尼伪逆（结果为 6×7）
///
/// # 参数
///
/// - `m`: 通常是 `Jᵀ`
/// - `lambda`: 阻尼系数，`0.0` 时退化为 Moore-Penrose 伪逆（奇异值为 0 的方向直接置零）
///
/// # 示例
///
/// ```
/// use armctl_math::{Matrix7x6, damped_pseudo_inverse};
///
/// let jt = Matrix7x6::identity();
/// let pinv = damped_pseudo_inverse(&jt, 0.0);
/// assert!((pinv * jt - nalgebra::Matrix6::identity()).norm() < 1e-9);
/// ```
pub fn damped_pseudo_inverse(m: &Matrix7x6, lambda: f64) -> Matrix6x7 {
    let svd = m.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Matrix6x7::zeros();
    };

    let lambda_sq = lambda * lambda;
    let inverted = svd.singular_values.map(|s| {
        let denom = s * s + lambda_sq;
        if denom > f64::EPSILON { s / denom } else { 0.0 }
    });

    v_t.transpose() * Matrix6::from_diagonal(&inverted) * u.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_jacobian_transpose() -> Matrix7x6 {
        Matrix7x6::from_fn(|r, c| ((r * 6 + c) as f64 * 0.37).sin() + if r == c { 1.5 } else { 0.0 })
    }

    #[test]
    fn test_undamped_is_left_inverse_for_full_rank() {
        let jt = sample_jacobian_transpose();
        let pinv = damped_pseudo_inverse(&jt, 0.0);

        assert_relative_eq!(pinv * jt, Matrix6::identity(), epsilon = 1e-9);
    }

    #[test]
    fn test_damping_shrinks_inverse() {
        let jt = sample_jacobian_transpose();
        let undamped = damped_pseudo_inverse(&jt, 0.0);
        let damped = damped_pseudo_inverse(&jt, DEFAULT_PINV_DAMPING);

        assert!(damped.norm() < undamped.norm());
    }

    #[test]
    fn test_singular_matrix_stays_finite() {
        // 全零雅可比：奇异值全为 0
        let pinv = damped_pseudo_inverse(&Matrix7x6::zeros(), DEFAULT_PINV_DAMPING);
        assert!(pinv.iter().all(|v| v.is_finite()));
        assert_relative_eq!(pinv, Matrix6x7::zeros(), epsilon = 1e-12);

        // 秩亏：两列相同
        let mut jt = sample_jacobian_transpose();
        let first = jt.column(0).into_owned();
        jt.set_column(1, &first);
        let pinv = damped_pseudo_inverse(&jt, DEFAULT_PINV_DAMPING);
        assert!(pinv.iter().all(|v| v.is_finite()));

        let pinv = damped_pseudo_inverse(&jt, 0.0);
        assert!(pinv.iter().all(|v| v.is_finite()));
    }
}
