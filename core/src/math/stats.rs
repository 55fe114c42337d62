pub struct StatsHelper;

impl StatsHelper {
    /// Percentile `p` (0-100) of the finite values, interpolating linearly
    /// between the closest ranks. Returns `None` when nothing finite remains.
    pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self::percentile_of_sorted(&sorted, p))
    }

    /// Low and high percentiles computed from a single sort.
    pub fn percentile_range(values: &[f64], low: f64, high: f64) -> Option<(f64, f64)> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some((
            Self::percentile_of_sorted(&sorted, low),
            Self::percentile_of_sorted(&sorted, high),
        ))
    }

    fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
        let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let weight = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_empty_input_is_none() {
        assert_eq!(StatsHelper::percentile(&[], 50.0), None);
        assert_eq!(StatsHelper::percentile(&[f64::NAN], 50.0), None);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        assert_eq!(StatsHelper::percentile(&values, 2.0), Some(2.0));
        assert_eq!(StatsHelper::percentile(&values, 98.0), Some(98.0));

        let pair = [10.0, 20.0];
        let p = StatsHelper::percentile(&pair, 25.0).unwrap();
        assert!((p - 12.5).abs() < 1e-9);
    }

    #[test]
    fn percentile_range_ignores_non_finite_samples() {
        let values = [f64::NAN, 1.0, 3.0, f64::INFINITY, 2.0];
        let (lo, hi) = StatsHelper::percentile_range(&values, 0.0, 100.0).unwrap();
        assert_eq!((lo, hi), (1.0, 3.0));
    }
}
