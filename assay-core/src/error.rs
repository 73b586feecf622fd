use thiserror::Error;

/// Invalid run parameters. These are the only errors a load or stress test surfaces to the
/// caller, and they are always raised before any work is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("total_requests must be greater than zero")]
    ZeroRequests,

    #[error("concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("stress test duration must be greater than zero")]
    ZeroDuration,

    #[error("requests_per_step must be greater than zero")]
    ZeroRequestsPerStep,

    #[error("invalid value {value:?} for environment variable {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Failure reported by an inference backend for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("inference request failed: {0}")]
    Request(String),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Failure to read process resource usage. Never fatal to a load test.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("current process not found")]
    ProcessNotFound,

    #[error("resource sampling unavailable: {0}")]
    Unavailable(&'static str),
}
