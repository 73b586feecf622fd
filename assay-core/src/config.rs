use crate::{
    ConfigError, MetricLabels, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PERFORMANCE_THRESHOLD, DEFAULT_RAMP_UP,
    DEFAULT_REQUESTS_PER_STEP, DEFAULT_SAMPLER_STOP_TIMEOUT, DEFAULT_SAMPLE_INTERVAL,
    DEFAULT_STRESS_DURATION, DEFAULT_TEMPERATURE, LOAD_TEST_LABELS, STRESS_TEST_LABELS,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Harness-wide settings.
///
/// Built explicitly and handed to whatever needs it; there is no process-wide instance.
#[serde_as]
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub huggingface_token: Option<String>,

    pub default_model: String,
    pub temperature: f64,
    pub max_tokens: u32,

    pub test_environment: String,
    pub log_level: String,
    pub enable_performance_tests: bool,
    pub enable_bias_tests: bool,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "performance_threshold_ms")]
    pub performance_threshold: Duration,
    pub concurrent_requests: usize,

    pub report_output_dir: String,
    pub enable_html_reports: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            huggingface_token: None,
            default_model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            test_environment: "development".to_string(),
            log_level: "INFO".to_string(),
            enable_performance_tests: true,
            enable_bias_tests: true,
            performance_threshold: DEFAULT_PERFORMANCE_THRESHOLD,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            report_output_dir: "./reports".to_string(),
            enable_html_reports: true,
        }
    }
}

impl HarnessConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each recognized key.
    ///
    /// Secrets and the model name use the provider's conventional variable names; every other
    /// setting is read from an `ASSAY_` prefixed variable. Durations accept human readable
    /// values such as `750ms` or `5s`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("OPENAI_API_KEY") {
            config.openai_api_key = Some(v);
        }
        if let Some(v) = lookup("ANTHROPIC_API_KEY") {
            config.anthropic_api_key = Some(v);
        }
        if let Some(v) = lookup("HUGGINGFACE_TOKEN") {
            config.huggingface_token = Some(v);
        }
        if let Some(v) = lookup("DEFAULT_MODEL") {
            config.default_model = v;
        }
        if let Some(v) = lookup("ASSAY_TEMPERATURE") {
            config.temperature = parse("ASSAY_TEMPERATURE", v)?;
        }
        if let Some(v) = lookup("ASSAY_MAX_TOKENS") {
            config.max_tokens = parse("ASSAY_MAX_TOKENS", v)?;
        }
        if let Some(v) = lookup("ASSAY_TEST_ENVIRONMENT") {
            config.test_environment = v;
        }
        if let Some(v) = lookup("ASSAY_LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("ASSAY_ENABLE_PERFORMANCE_TESTS") {
            config.enable_performance_tests = parse("ASSAY_ENABLE_PERFORMANCE_TESTS", v)?;
        }
        if let Some(v) = lookup("ASSAY_ENABLE_BIAS_TESTS") {
            config.enable_bias_tests = parse("ASSAY_ENABLE_BIAS_TESTS", v)?;
        }
        if let Some(v) = lookup("ASSAY_PERFORMANCE_THRESHOLD") {
            config.performance_threshold = humantime::parse_duration(&v).map_err(|_| {
                ConfigError::InvalidEnv {
                    key: "ASSAY_PERFORMANCE_THRESHOLD",
                    value: v,
                }
            })?;
        }
        if let Some(v) = lookup("ASSAY_CONCURRENT_REQUESTS") {
            config.concurrent_requests = parse("ASSAY_CONCURRENT_REQUESTS", v)?;
            if config.concurrent_requests == 0 {
                return Err(ConfigError::ZeroConcurrency);
            }
        }
        if let Some(v) = lookup("ASSAY_REPORT_OUTPUT_DIR") {
            config.report_output_dir = v;
        }
        if let Some(v) = lookup("ASSAY_ENABLE_HTML_REPORTS") {
            config.enable_html_reports = parse("ASSAY_ENABLE_HTML_REPORTS", v)?;
        }

        Ok(config)
    }
}

impl fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("huggingface_token", &redact(&self.huggingface_token))
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("test_environment", &self.test_environment)
            .field("log_level", &self.log_level)
            .field("enable_performance_tests", &self.enable_performance_tests)
            .field("enable_bias_tests", &self.enable_bias_tests)
            .field(
                "performance_threshold",
                &humantime::format_duration(self.performance_threshold).to_string(),
            )
            .field("concurrent_requests", &self.concurrent_requests)
            .field("report_output_dir", &self.report_output_dir)
            .field("enable_html_reports", &self.enable_html_reports)
            .finish()
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

/// Settings for a single load test run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadTestConfig {
    pub sample_interval: Duration,
    pub sampler_stop_timeout: Duration,
    pub labels: MetricLabels,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            sampler_stop_timeout: DEFAULT_SAMPLER_STOP_TIMEOUT,
            labels: LOAD_TEST_LABELS,
        }
    }
}

impl LoadTestConfig {
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn sampler_stop_timeout(mut self, timeout: Duration) -> Self {
        self.sampler_stop_timeout = timeout;
        self
    }

    pub fn labels(mut self, labels: MetricLabels) -> Self {
        self.labels = labels;
        self
    }
}

/// Settings for a stress test: how long to run, how long to ramp and how far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StressConfig {
    pub duration: Duration,
    pub ramp_up: Duration,
    pub max_concurrency: usize,
    pub requests_per_step: usize,
    pub load: LoadTestConfig,
}

impl StressConfig {
    pub fn new(duration: Duration, ramp_up: Duration, max_concurrency: usize) -> Self {
        Self {
            duration,
            ramp_up,
            max_concurrency,
            requests_per_step: DEFAULT_REQUESTS_PER_STEP,
            load: LoadTestConfig::default().labels(STRESS_TEST_LABELS),
        }
    }

    /// Reject settings that would make the stress test meaningless before it starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            Err(ConfigError::ZeroDuration)
        } else if self.max_concurrency == 0 {
            Err(ConfigError::ZeroConcurrency)
        } else if self.requests_per_step == 0 {
            Err(ConfigError::ZeroRequestsPerStep)
        } else {
            Ok(())
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STRESS_DURATION, DEFAULT_RAMP_UP, DEFAULT_MAX_CONCURRENCY)
    }
}
