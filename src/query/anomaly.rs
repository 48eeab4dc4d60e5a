//! Error-rate anomaly scoring across time buckets.
//!
//! Rates are scored against the population mean and population standard
//! deviation (divide by N) of all buckets with at least one record. Fewer
//! than three such buckets is reported as insufficient data rather than
//! scored against a meaningless baseline.

use super::views::percentage;
use crate::aggregate::AggregateCounts;
use serde::Serialize;

/// Minimum buckets with non-zero totals before rates are scored.
pub const MIN_QUALIFYING_BUCKETS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Error rate above `mean + 2σ`.
    Anomalous,
    /// Error rate below `mean - 2σ`.
    Low,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFinding {
    pub bucket: String,
    pub error_rate: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyAnalysis {
    pub mean: f64,
    pub std_dev: f64,
    /// One finding per qualifying bucket, ascending by bucket label.
    pub findings: Vec<AnomalyFinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnomalyReport {
    InsufficientData { qualifying_buckets: usize },
    Evaluated(AnomalyAnalysis),
}

/// Scores each qualifying bucket's error rate against the 2σ band.
pub fn detect_anomalies(counts: &AggregateCounts) -> AnomalyReport {
    let rates: Vec<(String, f64)> = counts
        .buckets()
        .filter_map(|(label, _)| {
            let total = counts.bucket_total(label);
            (total > 0).then(|| {
                let errors = counts.bucket_error_total(label);
                (label.to_string(), percentage(errors, total))
            })
        })
        .collect();

    if rates.len() < MIN_QUALIFYING_BUCKETS {
        return AnomalyReport::InsufficientData {
            qualifying_buckets: rates.len(),
        };
    }

    let n = rates.len() as f64;
    let mean = rates.iter().map(|(_, rate)| rate).sum::<f64>() / n;
    let variance = rates
        .iter()
        .map(|(_, rate)| (rate - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let findings = rates
        .into_iter()
        .map(|(bucket, error_rate)| {
            let verdict = if error_rate > mean + 2.0 * std_dev {
                Verdict::Anomalous
            } else if error_rate < mean - 2.0 * std_dev {
                Verdict::Low
            } else {
                Verdict::Normal
            };
            AnomalyFinding {
                bucket,
                error_rate,
                verdict,
            }
        })
        .collect();

    AnomalyReport::Evaluated(AnomalyAnalysis {
        mean,
        std_dev,
        findings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, Severity};

    /// Builds counts whose buckets have the given (errors, non-errors) mix.
    fn counts_with_rates(mix: &[(u64, u64)]) -> AggregateCounts {
        let mut counts = AggregateCounts::default();
        for (i, &(errors, infos)) in mix.iter().enumerate() {
            let bucket = format!("B{i:02}");
            for _ in 0..errors {
                counts.increment(&bucket, Domain::Kernel, Severity::Error);
            }
            for _ in 0..infos {
                counts.increment(&bucket, Domain::Misc, Severity::Info);
            }
        }
        counts
    }

    #[test]
    fn fewer_than_three_buckets_is_insufficient() {
        let counts = counts_with_rates(&[(1, 9), (2, 8)]);
        assert_eq!(
            detect_anomalies(&counts),
            AnomalyReport::InsufficientData {
                qualifying_buckets: 2
            }
        );
    }

    #[test]
    fn empty_counts_are_insufficient() {
        assert_eq!(
            detect_anomalies(&AggregateCounts::default()),
            AnomalyReport::InsufficientData {
                qualifying_buckets: 0
            }
        );
    }

    #[test]
    fn two_sigma_band_uses_population_stddev() {
        // Rates 2%, 2%, 2%, 20%: mean 6.5, population σ ≈ 7.794.
        // 20 < 6.5 + 2σ ≈ 22.09, so even the outlier stays NORMAL.
        let counts = counts_with_rates(&[(2, 98), (2, 98), (2, 98), (20, 80)]);
        let AnomalyReport::Evaluated(analysis) = detect_anomalies(&counts) else {
            panic!("expected an evaluated report");
        };

        assert!((analysis.mean - 6.5).abs() < 1e-9);
        assert!((analysis.std_dev - 7.794_228_634_059_948).abs() < 1e-9);
        assert!(
            analysis
                .findings
                .iter()
                .all(|finding| finding.verdict == Verdict::Normal)
        );
    }

    #[test]
    fn outlier_beyond_the_band_is_flagged() {
        // Rates 1% x5 and 60%: mean ≈ 10.83, σ ≈ 21.99; 60 > mean + 2σ ≈ 54.81.
        let quiet = (1, 99);
        let counts = counts_with_rates(&[quiet, quiet, quiet, quiet, quiet, (60, 40)]);
        let AnomalyReport::Evaluated(analysis) = detect_anomalies(&counts) else {
            panic!("expected an evaluated report");
        };

        let outlier = analysis
            .findings
            .iter()
            .find(|finding| finding.bucket == "B05")
            .unwrap();
        assert_eq!(outlier.verdict, Verdict::Anomalous);
        assert!(
            analysis
                .findings
                .iter()
                .filter(|finding| finding.bucket != "B05")
                .all(|finding| finding.verdict == Verdict::Normal)
        );
    }

    #[test]
    fn quiet_outlier_below_the_band_is_low() {
        // Rates 60% x5 and 1%: mean ≈ 50.17, σ ≈ 21.99; 1 < mean - 2σ ≈ 6.19.
        let noisy = (60, 40);
        let counts = counts_with_rates(&[noisy, noisy, noisy, noisy, noisy, (1, 99)]);
        let AnomalyReport::Evaluated(analysis) = detect_anomalies(&counts) else {
            panic!("expected an evaluated report");
        };

        let outlier = analysis
            .findings
            .iter()
            .find(|finding| finding.bucket == "B05")
            .unwrap();
        assert_eq!(outlier.verdict, Verdict::Low);
    }
}
