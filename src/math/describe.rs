//! Descriptive statistics over `f64` samples.
//!
//! Quantiles use linear interpolation between order statistics, so the
//! 25%/50%/75% rows line up with what spreadsheet tools report.

/// Summary of a numeric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator). `NaN` when `count < 2`.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    /// Rows in report order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Describe a sample. Returns `None` for an empty sample or one with non-finite values.
pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(Describe {
        count: sorted.len(),
        mean: mean(&sorted)?,
        std: sample_variance(&sorted).map(f64::sqrt).unwrap_or(f64::NAN),
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25)?,
        q50: quantile_sorted(&sorted, 0.50)?,
        q75: quantile_sorted(&sorted, 0.75)?,
        max: sorted[sorted.len() - 1],
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with `n - 1` denominator.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some(ss / (values.len() as f64 - 1.0))
}

/// Median; the mean of the two middle values for even-length samples.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.5)
}

/// Linear-interpolation quantile of an ascending sample, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// `part / whole * 100`, or `0` when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_known_summary() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0, 10.0]).unwrap();
        assert_eq!(d.count, 5);
        assert!((d.mean - 4.0).abs() < 1e-12);
        // variance = (9 + 4 + 1 + 0 + 36) / 4 = 12.5
        assert!((d.std - 12.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.q25, 2.0);
        assert_eq!(d.q50, 3.0);
        assert_eq!(d.q75, 4.0);
        assert_eq!(d.max, 10.0);
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&sorted, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.5).unwrap() - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.75).unwrap() - 3.25).abs() < 1e-12);
        assert!(quantile_sorted(&sorted, 1.5).is_none());
    }

    #[test]
    fn single_value_has_nan_std() {
        let d = describe(&[42.0]).unwrap();
        assert_eq!(d.count, 1);
        assert!(d.std.is_nan());
        assert_eq!(d.q25, 42.0);
    }

    #[test]
    fn empty_sample_is_none() {
        assert!(describe(&[]).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn percentage_handles_zero_whole() {
        assert_eq!(percentage(5, 0), 0.0);
        assert!((percentage(1, 4) - 25.0).abs() < 1e-12);
    }
}
