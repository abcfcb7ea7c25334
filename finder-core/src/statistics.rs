//! # Statistics Module
//!
//! Descriptive statistics over a recorded set of frequencies.

use serde::Serialize;

/// Summary of a non-empty set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
}

/// Computes min, max, mean and median of `samples`.
///
/// Returns `None` for an empty slice so callers can tell "nothing recorded"
/// apart from a recording of zeros. The input is never reordered; the median
/// is taken from a sorted copy.
pub fn calculate(samples: &[f32]) -> Option<Statistics> {
    if samples.is_empty() {
        return None;
    }

    let (min, max) = samples
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });

    // Accumulate in f64 so long recordings don't drift.
    let sum: f64 = samples.iter().map(|&s| s as f64).sum();
    let mean = (sum / samples.len() as f64) as f32;

    Some(Statistics {
        count: samples.len(),
        min,
        max,
        mean,
        median: median(samples),
    })
}

fn median(samples: &[f32]) -> f32 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f32::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_statistics() {
        assert_eq!(calculate(&[]), None);
    }

    #[test]
    fn odd_count() {
        let stats = calculate(&[100.0, 200.0, 300.0, 400.0, 500.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 500.0);
        assert_eq!(stats.mean, 300.0);
        assert_eq!(stats.median, 300.0);
    }

    #[test]
    fn even_count_averages_middle_pair() {
        let stats = calculate(&[100.0, 200.0, 300.0, 400.0]).unwrap();
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 400.0);
        assert_eq!(stats.mean, 250.0);
        assert_eq!(stats.median, 250.0);
    }

    #[test]
    fn unsorted_input_is_left_in_place() {
        let samples = [440.0, 110.0, 880.0, 220.0, 330.0];
        let stats = calculate(&samples).unwrap();
        assert_eq!(stats.median, 330.0);
        assert_eq!(stats.min, 110.0);
        assert_eq!(stats.max, 880.0);
        assert_eq!(samples, [440.0, 110.0, 880.0, 220.0, 330.0]);
    }

    #[test]
    fn single_sample() {
        let stats = calculate(&[261.63]).unwrap();
        assert_eq!(stats.min, 261.63);
        assert_eq!(stats.max, 261.63);
        assert_eq!(stats.mean, 261.63);
        assert_eq!(stats.median, 261.63);
    }

    #[test]
    fn median_resists_outliers() {
        let stats = calculate(&[440.0, 441.0, 439.0, 440.5, 2000.0]).unwrap();
        assert_eq!(stats.median, 440.5);
        assert!(stats.mean > 700.0);
    }

    #[test]
    fn zeros_are_data() {
        let stats = calculate(&[0.0, 0.0]).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.median, 0.0);
    }
}
