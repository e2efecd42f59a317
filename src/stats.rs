//! Descriptive statistics over raw score samples.

use serde::{Deserialize, Serialize};

/// Mean, population standard deviation, range and count of a sample.
///
/// An empty sample yields the all-zero value with `count == 0`; check `count`
/// before trusting the other fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl MetricStats {
    /// Summarize `values`. Standard deviation divides by N.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Summation rounding can push the mean a hair outside the range.
        let mean = if mean < min {
            min
        } else if mean > max {
            max
        } else {
            mean
        };

        Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
            count: values.len(),
        }
    }

    /// Whether any samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether all summary values are finite numbers.
    pub fn is_finite(&self) -> bool {
        [self.mean, self.std, self.min, self.max]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero_sentinel() {
        let stats = MetricStats::from_values(&[]);
        assert_eq!(stats, MetricStats::default());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_population_std() {
        let stats = MetricStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.count, 8);
    }

    #[test]
    fn test_single_value() {
        let stats = MetricStats::from_values(&[0.5]);
        assert_eq!(stats.mean, 0.5);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 0.5);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_bounds_hold_for_varied_samples() {
        let samples: Vec<Vec<f64>> = vec![
            vec![0.1, 0.1, 0.1],
            vec![-3.0, 10.0, 0.25],
            vec![1e-9, 1e9],
            (0..100).map(|i| (i as f64 * 0.37).sin()).collect(),
            vec![0.1; 7],
        ];

        for values in samples {
            let stats = MetricStats::from_values(&values);
            assert!(stats.min <= stats.mean, "{:?}", values);
            assert!(stats.mean <= stats.max, "{:?}", values);
            assert!(stats.std >= 0.0);
            assert_eq!(stats.count, values.len());
        }
    }

    #[test]
    fn test_non_finite_input_is_detected() {
        assert!(MetricStats::from_values(&[0.2, 0.4]).is_finite());
        assert!(MetricStats::default().is_finite());
        assert!(!MetricStats::from_values(&[0.2, f64::NAN]).is_finite());
        assert!(!MetricStats::from_values(&[f64::INFINITY]).is_finite());
    }

    #[test]
    fn test_deterministic() {
        let values = [0.3, 0.7, 0.11, 0.92];
        assert_eq!(MetricStats::from_values(&values), MetricStats::from_values(&values));
    }
}
