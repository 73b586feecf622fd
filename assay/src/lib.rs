#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod backend;
pub mod sampler;
pub mod stress;
pub mod tester;

pub(crate) mod controllers;
pub(crate) mod transaction;

pub use backend::{rotating_workload, workload, InferenceBackend, InferenceRequest};
pub use load_test::{run_load_test, LoadTester};
pub use stress::{run_stress_test, stress_test, StressTest};
pub use tester::ModelTester;

pub mod prelude {
    pub use crate::backend::{rotating_workload, workload, InferenceBackend, InferenceRequest};
    pub use crate::load_test::{run_load_test, LoadTester};
    pub use crate::sampler::{ProcessProbe, ResourceProbe};
    pub use crate::stress::{run_stress_test, stress_test, StressTest};
    pub use crate::tester::ModelTester;

    pub use assay_core::{
        BackendError, ConfigError, HarnessConfig, LoadTestConfig, PerformanceMetrics,
        ResourceSample, SamplerError, StressConfig, StressStep, StressTimeline, TestResult,
        TestStatus, TestSummary,
    };
}

pub use assay_core::{
    BackendError, ConfigError, HarnessConfig, LatencySummary, LoadTestConfig, MetricLabels,
    PerformanceMetrics, RequestOutcome, ResourceSample, SamplerError, StressConfig, StressStep,
    StressTimeline, TestResult, TestStatus, TestSummary,
};
