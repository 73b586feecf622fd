//! Functional and performance checks against a single model.
use crate::backend::{rotating_workload, InferenceBackend, InferenceRequest};
use crate::load_test::LoadTester;
use crate::sampler::ResourceProbe;
use assay_core::{HarnessConfig, LoadTestConfig, TestResult, TestStatus, TestSummary};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

const PERFORMANCE_MAX_TOKENS: u32 = 100;
const PREVIEW_CHARS: usize = 100;
const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Runs checks against one backend and keeps every [`TestResult`] it produced.
///
/// # Example
/// ```no_run
/// use assay::prelude::*;
/// use std::sync::Arc;
///
/// struct Canned;
///
/// impl InferenceBackend for Canned {
///     fn name(&self) -> &str {
///         "canned"
///     }
///
///     async fn infer(&self, _request: &InferenceRequest) -> Result<String, BackendError> {
///         Ok("Paris".to_string())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), ConfigError> {
///     let mut tester = ModelTester::new(Arc::new(Canned), HarnessConfig::from_env()?);
///
///     tester.test_inference("What is the capital of France?").await;
///     tester.test_performance(&["Hello", "What is AI?"], 20).await;
///     tester.test_prompt_consistency("Name a prime number.", 5).await;
///
///     println!("{}", serde_json::to_string_pretty(&tester.summary()).unwrap());
///     Ok(())
/// }
/// ```
pub struct ModelTester<B> {
    backend: Arc<B>,
    config: HarnessConfig,
    load: LoadTestConfig,
    probe: Option<Arc<dyn ResourceProbe>>,
    consistency_temperature: f64,
    results: Vec<TestResult>,
}

impl<B> ModelTester<B>
where
    B: InferenceBackend + Sync + 'static,
{
    pub fn new(backend: Arc<B>, config: HarnessConfig) -> Self {
        Self {
            backend,
            config,
            load: LoadTestConfig::default(),
            probe: None,
            consistency_temperature: 0.,
            results: vec![],
        }
    }

    /// Settings for the load test behind [`ModelTester::test_performance`].
    pub fn load_config(mut self, load: LoadTestConfig) -> Self {
        self.load = load;
        self
    }

    pub fn probe(mut self, probe: Arc<dyn ResourceProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sampling temperature for [`ModelTester::test_prompt_consistency`]. Defaults to `0.0`.
    pub fn consistency_temperature(mut self, temperature: f64) -> Self {
        self.consistency_temperature = temperature;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn summary(&self) -> TestSummary {
        TestSummary::from_results(&self.config.default_model, &self.results)
    }

    /// Single request; passes when the backend answers with anything non-empty.
    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn test_inference(&mut self, prompt: &str) -> TestResult {
        let request = InferenceRequest::from_config(&self.config, prompt);
        let start = Instant::now();

        let result = match InferenceBackend::infer(&*self.backend, &request).await {
            Ok(output) => {
                let status = if output.is_empty() {
                    TestStatus::Failed
                } else {
                    TestStatus::Passed
                };
                TestResult::new("inference_test", status)
                    .with_message(format!("Generated response: {}...", preview(&output)))
                    .with_metadata(json!({ "prompt": prompt, "response": output }))
                    .with_execution_time(start.elapsed())
            }
            Err(err) => {
                warn!("Inference failed: {err}");
                TestResult::new("inference_test", TestStatus::Error).with_message(err.to_string())
            }
        };

        self.record(result)
    }

    /// Load test the backend with `num_requests` requests cycling through `prompts`.
    ///
    /// Concurrency comes from [`HarnessConfig::concurrent_requests`]. The score is the average
    /// latency in milliseconds; the test passes when every request succeeded and the average
    /// is within [`HarnessConfig::performance_threshold`].
    #[instrument(skip_all, fields(backend = self.backend.name(), num_requests = num_requests))]
    pub async fn test_performance(&mut self, prompts: &[&str], num_requests: usize) -> TestResult {
        const NAME: &str = "performance_test";

        if !self.config.enable_performance_tests {
            return self.record(
                TestResult::new(NAME, TestStatus::Skipped)
                    .with_message("Performance tests are disabled"),
            );
        }
        if prompts.is_empty() {
            return self.record(
                TestResult::new(NAME, TestStatus::Error).with_message("No prompts to send"),
            );
        }

        let requests = prompts
            .iter()
            .map(|prompt| {
                InferenceRequest::from_config(&self.config, prompt)
                    .max_tokens(PERFORMANCE_MAX_TOKENS)
            })
            .collect();
        let work = rotating_workload(self.backend.clone(), requests);

        let mut tester = LoadTester::new(self.load);
        if let Some(probe) = &self.probe {
            tester = tester.with_probe(probe.clone());
        }

        let start = Instant::now();
        let metrics = match tester
            .run(work, num_requests, self.config.concurrent_requests)
            .await
        {
            Ok(metrics) => metrics,
            Err(err) => {
                return self.record(
                    TestResult::new(NAME, TestStatus::Error).with_message(err.to_string()),
                )
            }
        };

        let threshold_ms = self.config.performance_threshold.as_secs_f64() * 1e3;
        let status = if metrics.failed_requests == 0 && metrics.avg_latency_ms <= threshold_ms {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        };
        debug!(
            "Average latency {:.2}ms against a threshold of {threshold_ms:.2}ms",
            metrics.avg_latency_ms
        );

        let metadata = serde_json::to_value(metrics.rounded()).unwrap_or_default();
        let result = TestResult::new(NAME, status)
            .with_score(metrics.avg_latency_ms)
            .with_message(format!(
                "Average latency: {:.2}ms ({} of {} requests failed)",
                metrics.avg_latency_ms, metrics.failed_requests, metrics.total_requests
            ))
            .with_metadata(metadata)
            .with_execution_time(start.elapsed());

        self.record(result)
    }

    /// Send `prompt` `num_runs` times and score how often the answers agree.
    ///
    /// Requests use the temperature set with [`ModelTester::consistency_temperature`], zero
    /// unless changed. Identical answers score `1.0`; every extra distinct answer costs
    /// `1 / num_runs`.
    #[instrument(skip_all, fields(backend = self.backend.name(), num_runs = num_runs))]
    pub async fn test_prompt_consistency(&mut self, prompt: &str, num_runs: usize) -> TestResult {
        const NAME: &str = "prompt_consistency_test";

        if num_runs == 0 {
            return self.record(
                TestResult::new(NAME, TestStatus::Error)
                    .with_message("num_runs must be at least 1"),
            );
        }

        let request = InferenceRequest::from_config(&self.config, prompt)
            .temperature(self.consistency_temperature);
        let start = Instant::now();

        let mut responses = Vec::with_capacity(num_runs);
        for _ in 0..num_runs {
            match InferenceBackend::infer(&*self.backend, &request).await {
                Ok(response) => responses.push(response),
                Err(err) => {
                    warn!("Consistency run failed: {err}");
                    return self.record(
                        TestResult::new(NAME, TestStatus::Error).with_message(err.to_string()),
                    );
                }
            }
        }

        let unique = responses.iter().collect::<HashSet<_>>().len();
        let score = 1. - (unique - 1) as f64 / num_runs as f64;

        let result = TestResult::new(NAME, TestStatus::Passed)
            .with_score(score)
            .with_message(format!("Consistency score: {score:.2}"))
            .with_metadata(json!({
                "prompt": prompt,
                "num_unique_responses": unique,
                "responses": responses,
            }))
            .with_execution_time(start.elapsed());

        self.record(result)
    }

    /// Compare the answer to `prompt` with `ground_truth`.
    ///
    /// `similarity` maps `(response, ground_truth)` to a score in `[0, 1]`. The test passes
    /// when the score is above `0.5`.
    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn test_hallucination_detection<F>(
        &mut self,
        prompt: &str,
        ground_truth: &str,
        similarity: F,
    ) -> TestResult
    where
        F: FnOnce(&str, &str) -> f64,
    {
        const NAME: &str = "hallucination_detection_test";

        let request = InferenceRequest::from_config(&self.config, prompt);
        let start = Instant::now();

        let output = match InferenceBackend::infer(&*self.backend, &request).await {
            Ok(output) => output,
            Err(err) => {
                warn!("Hallucination check failed: {err}");
                return self.record(
                    TestResult::new(NAME, TestStatus::Error).with_message(err.to_string()),
                );
            }
        };

        let score = similarity(&output, ground_truth);
        trace!("Similarity {score:.4} for {output:?}");
        let status = if score > SIMILARITY_THRESHOLD {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        };

        let result = TestResult::new(NAME, status)
            .with_score(score)
            .with_message(format!("Similarity to ground truth: {score:.2}"))
            .with_metadata(json!({
                "prompt": prompt,
                "ground_truth": ground_truth,
                "response": output,
            }))
            .with_execution_time(start.elapsed());

        self.record(result)
    }

    fn record(&mut self, result: TestResult) -> TestResult {
        info!("{}: {:?}", result.test_name, result.status);
        self.results.push(result.clone());
        result
    }
}

fn preview(output: &str) -> &str {
    match output.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &output[..idx],
        None => output,
    }
}
