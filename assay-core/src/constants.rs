use std::time::Duration;

/// How often the resource sampler records CPU and memory usage during a load test.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// How long a load test waits for the resource sampler to stop before giving up on it.
pub const DEFAULT_SAMPLER_STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Requests issued per unit of concurrency in each stress test step.
pub const DEFAULT_REQUESTS_PER_STEP: usize = 10;

/// Average latency above which a performance test is marked as failed.
pub const DEFAULT_PERFORMANCE_THRESHOLD: Duration = Duration::from_millis(5000);

pub const DEFAULT_CONCURRENT_REQUESTS: usize = 10;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Stress test defaults: a one minute run ramping to 50 concurrent requests over 10 seconds.
pub const DEFAULT_STRESS_DURATION: Duration = Duration::from_secs(60);
pub const DEFAULT_RAMP_UP: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;
