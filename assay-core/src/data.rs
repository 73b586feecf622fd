use crate::stats::{mean, LatencySummary};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// The recorded result of one dispatched unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success { latency: Duration },
    Failure { error: String },
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn latency(&self) -> Option<Duration> {
        match self {
            Self::Success { latency } => Some(*latency),
            Self::Failure { .. } => None,
        }
    }
}

/// Point-in-time resource usage of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

/// Summary of a single load test run.
///
/// Latency fields are in milliseconds and only cover successful requests. When no request
/// succeeded every latency field and the throughput are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub throughput_rps: f64,
    pub total_duration_s: f64,
    pub cpu_usage_percent: f64,
    pub memory_usage_mb: f64,
}

impl PerformanceMetrics {
    /// Reduce the outcomes of a run into its metrics.
    ///
    /// `total_duration` is the wall-clock time from first dispatch to last completion. Any
    /// request without a recorded outcome is counted as failed, so
    /// `successful_requests + failed_requests == total_requests` always holds.
    pub fn from_run(
        total_requests: usize,
        outcomes: &[RequestOutcome],
        total_duration: Duration,
        resources: &[ResourceSample],
    ) -> Self {
        let latencies: Vec<Duration> = outcomes
            .iter()
            .filter_map(RequestOutcome::latency)
            .collect();
        let successful_requests = latencies.len().min(total_requests);
        let failed_requests = total_requests - successful_requests;
        let total_duration_s = total_duration.as_secs_f64();

        let cpu: Vec<f64> = resources.iter().map(|s| s.cpu_percent).collect();
        let memory: Vec<f64> = resources.iter().map(|s| s.memory_mb).collect();

        let mut metrics = Self {
            total_requests,
            successful_requests,
            failed_requests,
            avg_latency_ms: 0.,
            min_latency_ms: 0.,
            max_latency_ms: 0.,
            p50_latency_ms: 0.,
            p95_latency_ms: 0.,
            p99_latency_ms: 0.,
            throughput_rps: 0.,
            total_duration_s,
            cpu_usage_percent: mean(&cpu),
            memory_usage_mb: mean(&memory),
        };

        if let Some(summary) = LatencySummary::from_latencies(&latencies) {
            metrics.avg_latency_ms = summary.mean_ms;
            metrics.min_latency_ms = summary.min_ms;
            metrics.max_latency_ms = summary.max_ms;
            metrics.p50_latency_ms = summary.p50_ms;
            metrics.p95_latency_ms = summary.p95_ms;
            metrics.p99_latency_ms = summary.p99_ms;
            if total_duration_s > 0. {
                metrics.throughput_rps = successful_requests as f64 / total_duration_s;
            }
        }

        metrics
    }

    /// Copy with every floating point field rounded to two decimals, the precision reports
    /// are exported with.
    pub fn rounded(&self) -> Self {
        Self {
            avg_latency_ms: round2(self.avg_latency_ms),
            min_latency_ms: round2(self.min_latency_ms),
            max_latency_ms: round2(self.max_latency_ms),
            p50_latency_ms: round2(self.p50_latency_ms),
            p95_latency_ms: round2(self.p95_latency_ms),
            p99_latency_ms: round2(self.p99_latency_ms),
            throughput_rps: round2(self.throughput_rps),
            total_duration_s: round2(self.total_duration_s),
            cpu_usage_percent: round2(self.cpu_usage_percent),
            memory_usage_mb: round2(self.memory_usage_mb),
            ..self.clone()
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.
        } else {
            self.failed_requests as f64 / self.total_requests as f64
        }
    }
}

impl fmt::Display for PerformanceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Requests={} (ok={}, err={}), TPS={:.2}, ",
            self.total_requests,
            self.successful_requests,
            self.failed_requests,
            self.throughput_rps,
        )?;
        write!(
            f,
            "avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, CPU={:.1}%, Mem={:.1}MB",
            self.avg_latency_ms,
            self.p50_latency_ms,
            self.p95_latency_ms,
            self.p99_latency_ms,
            self.cpu_usage_percent,
            self.memory_usage_mb,
        )
    }
}

fn round2(val: f64) -> f64 {
    (val * 100.).round() / 100.
}

/// One interval of a stress test: the concurrency it ran at and what it measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressStep {
    pub concurrency: usize,
    pub metrics: PerformanceMetrics,
}

/// Ordered results of a stress test, one step per ramp interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StressTimeline {
    steps: Vec<StressStep>,
}

impl StressTimeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, step: StressStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[StressStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StressStep> {
        self.steps.iter()
    }

    /// Total requests issued in each step, in order.
    pub fn request_counts(&self) -> Vec<usize> {
        self.steps.iter().map(|s| s.metrics.total_requests).collect()
    }

    pub fn into_steps(self) -> Vec<StressStep> {
        self.steps
    }
}

impl IntoIterator for StressTimeline {
    type Item = StressStep;
    type IntoIter = std::vec::IntoIter<StressStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
