//! Gaussian kernel density estimate with Scott's bandwidth.
//!
//! Ages are integers, so a national death file collapses to ~120 distinct
//! values. We evaluate the kernel over distinct values weighted by their
//! multiplicity instead of over every record.

use std::collections::BTreeMap;
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct GaussianKde {
    /// `(value, multiplicity)` pairs.
    support: Vec<(f64, f64)>,
    total: f64,
    bandwidth: f64,
}

impl GaussianKde {
    /// Build a KDE from raw samples.
    ///
    /// Returns `None` for fewer than two finite samples or zero spread.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let n = finite.len();
        if n < 2 {
            return None;
        }
        let std = crate::math::sample_variance(&finite)?.sqrt();
        if !(std.is_finite() && std > 0.0) {
            return None;
        }
        let bandwidth = std * (n as f64).powf(-0.2);

        let mut counts: BTreeMap<u64, (f64, f64)> = BTreeMap::new();
        for v in finite {
            let entry = counts.entry(v.to_bits()).or_insert((v, 0.0));
            entry.1 += 1.0;
        }

        Some(Self {
            support: counts.into_values().collect(),
            total: n as f64,
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Probability density at `x`.
    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.total * h * (2.0 * PI).sqrt());
        let sum: f64 = self
            .support
            .iter()
            .map(|&(v, w)| {
                let z = (x - v) / h;
                w * (-0.5 * z * z).exp()
            })
            .sum();
        sum * norm
    }

    /// `n` evenly spaced `(x, density * scale)` points over `[lo, hi]`.
    ///
    /// With `scale = total * bin_width` the curve overlays a count histogram.
    pub fn curve(&self, lo: f64, hi: f64, n: usize, scale: f64) -> Vec<(f64, f64)> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / (n as f64 - 1.0);
                (x, self.density(x) * scale)
            })
            .collect()
    }

    pub fn sample_size(&self) -> f64 {
        self.total
    }
}
