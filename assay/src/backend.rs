//! The inference backend capability.
//!
//! Provider clients (OpenAI, Anthropic, a local model server, ...) live outside the harness and
//! plug in by implementing [`InferenceBackend`]. The harness only ever asks a backend to run
//! one request.
use assay_core::{BackendError, HarnessConfig};
use futures_util::future::BoxFuture;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// A single prompt to send to a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl InferenceRequest {
    /// Request for `prompt` using the model and sampling settings from `config`.
    pub fn from_config(config: &HarnessConfig, prompt: &str) -> Self {
        Self {
            model: config.default_model.clone(),
            prompt: prompt.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Something that can answer a prompt.
///
/// Implement [`InferenceBackend`]; the local variant exists for backends whose futures are not
/// `Send` and is not accepted by the load test engine.
#[trait_variant::make(InferenceBackend: Send)]
pub trait LocalInferenceBackend {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    async fn infer(&self, request: &InferenceRequest) -> Result<String, BackendError>;
}

/// Adapt a backend into the zero-argument work function load tests dispatch.
pub fn workload<B>(
    backend: Arc<B>,
    request: InferenceRequest,
) -> impl Fn() -> BoxFuture<'static, Result<String, BackendError>> + Clone + Send + Sync + 'static
where
    B: InferenceBackend + Sync + 'static,
{
    let request = Arc::new(request);
    move || {
        let backend = backend.clone();
        let request = request.clone();
        let fut: BoxFuture<'static, _> =
            Box::pin(async move { InferenceBackend::infer(&*backend, &request).await });
        fut
    }
}

/// Like [`workload`], but each invocation takes the next request in turn, wrapping around.
///
/// # Panics
/// Panics if `requests` is empty.
pub fn rotating_workload<B>(
    backend: Arc<B>,
    requests: Vec<InferenceRequest>,
) -> impl Fn() -> BoxFuture<'static, Result<String, BackendError>> + Clone + Send + Sync + 'static
where
    B: InferenceBackend + Sync + 'static,
{
    assert!(!requests.is_empty(), "rotating_workload needs at least one request");

    let requests: Arc<[InferenceRequest]> = requests.into();
    let next = Arc::new(AtomicUsize::new(0));
    move || {
        let backend = backend.clone();
        let requests = requests.clone();
        let idx = next.fetch_add(1, Ordering::Relaxed) % requests.len();
        let fut: BoxFuture<'static, _> =
            Box::pin(async move { InferenceBackend::infer(&*backend, &requests[idx]).await });
        fut
    }
}
