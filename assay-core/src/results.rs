use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Outcome of one harness test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Error,
}

/// Result of a single harness test, as handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test_name: String,
    pub status: TestStatus,
    pub score: Option<f64>,
    pub message: Option<String>,
    pub metadata: Option<Value>,
    pub execution_time_ms: Option<f64>,
}

impl TestResult {
    pub fn new(test_name: &str, status: TestStatus) -> Self {
        Self {
            test_name: test_name.to_string(),
            status,
            score: None,
            message: None,
            metadata: None,
            execution_time_ms: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_execution_time(mut self, elapsed: Duration) -> Self {
        self.execution_time_ms = Some(elapsed.as_secs_f64() * 1e3);
        self
    }
}

/// Pass/fail tally over every result a tester recorded for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub model_name: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub results: Vec<TestResult>,
}

impl TestSummary {
    pub fn from_results(model_name: &str, results: &[TestResult]) -> Self {
        let total_tests = results.len();
        let passed = count(results, TestStatus::Passed);
        let failed = count(results, TestStatus::Failed);
        let pass_rate = if total_tests > 0 {
            passed as f64 / total_tests as f64
        } else {
            0.
        };

        Self {
            model_name: model_name.to_string(),
            total_tests,
            passed,
            failed,
            pass_rate,
            results: results.to_vec(),
        }
    }
}

fn count(results: &[TestResult], status: TestStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}
