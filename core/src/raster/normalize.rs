use crate::math::stats::StatsHelper;
use crate::prelude::DEFAULT_BANDS;
use ndarray::Array2;

pub const LOW_PERCENTILE: f64 = 2.0;
pub const HIGH_PERCENTILE: f64 = 98.0;

/// Percentile stretch of one band to 8 bits. Flat bands come out all zero.
pub fn normalize_band(band: &Array2<f64>) -> Array2<u8> {
    let values: Vec<f64> = band.iter().copied().collect();
    match StatsHelper::percentile_range(&values, LOW_PERCENTILE, HIGH_PERCENTILE) {
        Some((low, high)) if high > low => band.mapv(|v| stretch(v, low, high)),
        _ => Array2::zeros(band.raw_dim()),
    }
}

fn stretch(value: f64, low: f64, high: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    ((value - low) / (high - low) * 255.0).clamp(0.0, 255.0) as u8
}

/// Validates a 1-based band selection, falling back to bands 1, 2, 3 when any
/// index is out of range.
pub fn select_bands(requested: [usize; 3], band_count: usize) -> [usize; 3] {
    if requested.iter().all(|b| (1..=band_count).contains(b)) {
        requested
    } else {
        DEFAULT_BANDS
    }
}
