//! An [`InferenceBackend`] that talks to a running mock backend over HTTP.
use crate::CompletionResponse;
use assay::prelude::*;
use reqwest::Client;
use std::net::SocketAddr;

/// Sends completion requests to one route of a mock backend, e.g. `"delay/ms/10"`.
///
/// Each backend owns its connection pool, so it must be used from a single tokio runtime.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    pub fn new(addr: SocketAddr, route: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("http://{addr}/{route}/complete"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl InferenceBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.url
    }

    async fn infer(&self, request: &InferenceRequest) -> Result<String, BackendError> {
        let res = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| BackendError::Request(err.to_string()))?;

        let completion: CompletionResponse = res
            .json()
            .await
            .map_err(|err| BackendError::Request(err.to_string()))?;
        Ok(completion.text)
    }
}
