/// Metric names recorded for every invocation when the `metrics` feature of `assay` is enabled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MetricLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

#[macro_export]
macro_rules! generate_labels {
    ($base_name:expr) => {
        $crate::MetricLabels {
            success: concat!(stringify!($base_name), "_success"),
            error: concat!(stringify!($base_name), "_error"),
            latency: concat!(stringify!($base_name), "_latency"),
        }
    };
}

/// Labels used by plain load tests.
pub const LOAD_TEST_LABELS: MetricLabels = generate_labels!(assay_load_test);

/// Labels used by the load tests a stress test runs for each step.
pub const STRESS_TEST_LABELS: MetricLabels = generate_labels!(assay_stress_test);
