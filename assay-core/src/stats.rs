use std::time::Duration;

/// Latency statistics over the successful requests of a single load test, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl LatencySummary {
    /// Summarize a set of latencies. Returns `None` when there are no latencies at all, since
    /// no statistic is meaningful in that case.
    pub fn from_latencies(latencies: &[Duration]) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }

        let mut sorted: Vec<f64> = latencies.iter().map(|d| d.as_secs_f64() * 1e3).collect();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            mean_ms: mean(&sorted),
            p50_ms: percentile(&sorted, 50.),
            p95_ms: percentile(&sorted, 95.),
            p99_ms: percentile(&sorted, 99.),
        })
    }
}

/// Percentile of an ascending slice using linear interpolation between the closest ranks,
/// evaluated at index `(p / 100) * (n - 1)`.
///
/// `p` is clamped to `[0, 100]`. An empty slice yields `0.0`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0., 100.) / 100.) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;

            let (lo, hi) = (sorted[lower], sorted[upper]);
            // NOTE: Clamp so float rounding never pushes the result past the upper rank.
            (lo + (hi - lo) * weight).min(hi)
        }
    }
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.
    } else {
        statistical::mean(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn percentile_interpolates() {
        let sorted = [1., 2., 3., 4.];
        assert_eq!(percentile(&sorted, 0.), 1.);
        assert_eq!(percentile(&sorted, 50.), 2.5);
        assert_eq!(percentile(&sorted, 100.), 4.);
        assert!((percentile(&sorted, 95.) - 3.85).abs() < 1e-9);
    }

    #[test]
    fn percentile_edge_cases() {
        assert_eq!(percentile(&[], 50.), 0.);
        assert_eq!(percentile(&[7.], 99.), 7.);
        assert_eq!(percentile(&[1., 2.], 150.), 2.);
        assert_eq!(percentile(&[1., 2.], -10.), 1.);
    }

    #[test]
    fn summary_of_nothing() {
        assert!(LatencySummary::from_latencies(&[]).is_none());
    }

    #[test]
    fn summary_is_ordered() {
        let mut rng = SmallRng::seed_from_u64(7);
        let latencies: Vec<Duration> = (0..257)
            .map(|_| Duration::from_micros(rng.gen_range(100..250_000)))
            .collect();

        let summary = LatencySummary::from_latencies(&latencies).unwrap();
        assert!(summary.min_ms <= summary.p50_ms);
        assert!(summary.p50_ms <= summary.p95_ms);
        assert!(summary.p95_ms <= summary.p99_ms);
        assert!(summary.p99_ms <= summary.max_ms);
        assert!(summary.mean_ms >= summary.min_ms && summary.mean_ms <= summary.max_ms);
    }

    #[test]
    fn summary_is_deterministic() {
        let latencies = [
            Duration::from_millis(40),
            Duration::from_millis(10),
            Duration::from_millis(30),
            Duration::from_millis(20),
        ];

        let first = LatencySummary::from_latencies(&latencies).unwrap();
        let second = LatencySummary::from_latencies(&latencies).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.min_ms, 10.);
        assert_eq!(first.max_ms, 40.);
        assert_eq!(first.mean_ms, 25.);
        assert_eq!(first.p50_ms, 25.);
    }

    #[test]
    fn mean_of_nothing() {
        assert_eq!(mean(&[]), 0.);
        assert_eq!(mean(&[1., 2., 3.]), 2.);
    }
}
