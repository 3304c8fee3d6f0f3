//! Distribution summary of efficacy values for one (order, heuristic) pair,
//! also used for the generated input distributions.

use std::fmt;

use serde::Serialize;

/// Number of equal-width bins used to find the modal efficacy.
pub const HISTOGRAM_BINS: usize = 20;

/// Aggregate statistics over a series of efficacy values.
///
/// Undefined trials are counted but excluded from every statistic. When no
/// trial is defined the statistics are `NaN`.
#[derive(Debug, Clone, Serialize)]
pub struct EfficacySummary {
    /// Number of trials, defined or not.
    pub trials: usize,
    /// Trials whose efficacy was undefined.
    pub undefined: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
    /// Left edge of the most populated of [`HISTOGRAM_BINS`] bins spanning
    /// `[min, max]`.
    pub mode_bin_start: f64,
}

impl EfficacySummary {
    /// Summarizes a series with no undefined entries.
    pub fn from_samples(values: &[f64]) -> Self {
        let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        Self::from_values(&wrapped)
    }

    /// Summarizes a series where `None` marks an undefined trial.
    pub fn from_values(values: &[Option<f64>]) -> Self {
        let mut defined: Vec<f64> = values.iter().flatten().copied().collect();
        let undefined = values.len() - defined.len();

        if defined.is_empty() {
            return Self {
                trials: values.len(),
                undefined,
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                median: f64::NAN,
                max: f64::NAN,
                mode_bin_start: f64::NAN,
            };
        }

        defined.sort_by(f64::total_cmp);
        let n = defined.len() as f64;
        let mean = defined.iter().sum::<f64>() / n;
        let variance = defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = defined[0];
        let max = defined[defined.len() - 1];
        let mid = defined.len() / 2;
        let median = if defined.len() % 2 == 0 {
            (defined[mid - 1] + defined[mid]) / 2.0
        } else {
            defined[mid]
        };

        Self {
            trials: values.len(),
            undefined,
            mean,
            std_dev: variance.sqrt(),
            min,
            median,
            max,
            mode_bin_start: mode_bin_start(&defined, min, max),
        }
    }
}

fn mode_bin_start(values: &[f64], min: f64, max: f64) -> f64 {
    let width = (max - min) / HISTOGRAM_BINS as f64;
    if width == 0.0 {
        return min;
    }

    let mut counts = [0_usize; HISTOGRAM_BINS];
    for &v in values {
        // The top edge belongs to the last bin.
        let bin = (((v - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    min + width * best as f64
}

impl fmt::Display for EfficacySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} undefined={} mean={:.4} sd={:.4} min={:.4} median={:.4} max={:.4} mode~{:.4}",
            self.trials,
            self.undefined,
            self.mean,
            self.std_dev,
            self.min,
            self.median,
            self.max,
            self.mode_bin_start,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_statistics() {
        let values = [Some(0.5), Some(1.0), Some(0.75), Some(0.25)];
        let s = EfficacySummary::from_values(&values);
        assert_eq!(s.trials, 4);
        assert_eq!(s.undefined, 0);
        assert!((s.mean - 0.625).abs() < 1e-12);
        assert_eq!(s.min, 0.25);
        assert_eq!(s.max, 1.0);
        assert!((s.median - 0.625).abs() < 1e-12);
    }

    #[test]
    fn undefined_values_are_counted_not_averaged() {
        let values = [Some(1.0), None, Some(0.0)];
        let s = EfficacySummary::from_values(&values);
        assert_eq!(s.trials, 3);
        assert_eq!(s.undefined, 1);
        assert_eq!(s.mean, 0.5);
        assert_eq!(s.median, 0.5);
    }

    #[test]
    fn all_undefined_yields_nan() {
        let s = EfficacySummary::from_values(&[None, None]);
        assert_eq!(s.undefined, 2);
        assert!(s.mean.is_nan());
    }

    #[test]
    fn mode_bin_finds_cluster() {
        let mut values = vec![Some(0.0), Some(1.0)];
        values.extend(std::iter::repeat_n(Some(0.92), 10));
        let s = EfficacySummary::from_values(&values);
        // Bins are 0.05 wide; 0.92 falls in the bin starting at 0.9.
        assert!((s.mode_bin_start - 0.9).abs() < 1e-9);
    }

    #[test]
    fn constant_series_mode_is_the_value() {
        let s = EfficacySummary::from_values(&[Some(0.5); 5]);
        assert_eq!(s.mode_bin_start, 0.5);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn plain_samples_have_no_undefined_entries() {
        let s = EfficacySummary::from_samples(&[300.0, 100.0, 200.0]);
        assert_eq!(s.trials, 3);
        assert_eq!(s.undefined, 0);
        assert_eq!(s.median, 200.0);
    }

    #[test]
    fn display_does_not_panic() {
        let s = EfficacySummary::from_values(&[Some(0.3)]);
        assert!(!format!("{s}").is_empty());
    }
}
