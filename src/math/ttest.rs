//! Welch's unequal-variance two-sample t-test.

use crate::math::special::student_t_two_sided_p;
use crate::math::{mean, sample_variance};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTTest {
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Compare the means of `a` and `b` without assuming equal variances.
///
/// Returns `None` when either sample has fewer than two values or both
/// samples have zero variance.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<WelchTTest> {
    let na = a.len() as f64;
    let nb = b.len() as f64;
    let va = sample_variance(a)? / na;
    let vb = sample_variance(b)? / nb;

    let se2 = va + vb;
    if !(se2.is_finite() && se2 > 0.0) {
        return None;
    }

    let t = (mean(a)? - mean(b)?) / se2.sqrt();
    let df = se2 * se2 / (va * va / (na - 1.0) + vb * vb / (nb - 1.0));
    let p_value = student_t_two_sided_p(t, df);

    Some(WelchTTest { t, df, p_value })
}
