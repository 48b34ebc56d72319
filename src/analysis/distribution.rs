//! Plot data for the value distributions of the two groups

use std::f64::consts::PI;
use std::ops::Range;

use serde::Serialize;

/// A Gaussian kernel density estimate sampled on an even grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    /// Kernel bandwidth (Scott's rule)
    pub bandwidth: f64,
    /// `(x, density)` pairs in ascending `x`
    pub points: Vec<(f64, f64)>,
}

impl DensityCurve {
    /// Estimate the density of `values` on `grid_points` points
    ///
    /// The grid spans `[min - 3h, max + 3h]` for bandwidth `h`. Returns
    /// `None` for fewer than two values, zero spread or fewer than two grid
    /// points.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Option<Self> {
        if values.len() < 2 || grid_points < 2 {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        if std_dev <= 0.0 {
            return None;
        }
        let bandwidth = std_dev * n.powf(-0.2);

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let start = min - 3.0 * bandwidth;
        let step = (max - min + 6.0 * bandwidth) / (grid_points - 1) as f64;
        let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

        let points = (0..grid_points)
            .map(|k| {
                let x = start + step * k as f64;
                let density = values
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect();

        Some(Self { bandwidth, points })
    }
}

/// A density-normalised histogram: bar areas sum to 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

/// One equal-width bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Covered values; the last bin also includes its end
    pub range: Range<f64>,
    pub count: usize,
    pub density: f64,
}

impl Histogram {
    /// Bin `values` into `num_bins` equal-width bins over `[min, max]`
    ///
    /// All-equal values fall in one bin of width 1 centred on the value.
    /// Returns `None` for no values or no bins.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn density(values: &[f64], num_bins: usize) -> Option<Self> {
        if values.is_empty() || num_bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (start, width, num_bins) = if max > min {
            (min, (max - min) / num_bins as f64, num_bins)
        } else {
            (min - 0.5, 1.0, 1)
        };

        let mut counts = vec![0usize; num_bins];
        for v in values {
            let idx = (((v - start) / width).floor() as usize).min(num_bins - 1);
            counts[idx] += 1;
        }

        let total = values.len() as f64;
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let lo = start + width * i as f64;
                HistogramBin {
                    range: lo..lo + width,
                    count,
                    density: count as f64 / (total * width),
                }
            })
            .collect();

        Some(Self { bins })
    }
}
