pub mod client;

use axum::{debug_handler, extract::Path, http::StatusCode, routing::post, Json, Router};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use lazy_static::lazy_static;
#[allow(unused)]
use metrics::{counter, gauge, histogram};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Body of every completion route. Mirrors the request shape of the common provider APIs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionResponse {
    pub model: String,
    pub text: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/delay/ms/:delay_ms/complete", post(delay))
        .route("/jitter/ms/:mean_ms/complete", post(jitter))
        .route(
            "/fail/every/:every/delay/ms/:delay_ms/scenario/:scenario_name/complete",
            post(fail_every),
        )
        .route(
            "/limited/:max_rps/delay/ms/:delay_ms/scenario/:scenario_name/complete",
            post(limited),
        )
        .route("/empty/complete", post(empty))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!("Mock backend listening on {addr}");
    axum::serve(listener, router()).await?;
    Ok(())
}

/// Answers after exactly `delay_ms`.
#[debug_handler]
pub async fn delay(
    Path(delay_ms): Path<u64>,
    Json(req): Json<CompletionRequest>,
) -> Json<CompletionResponse> {
    record_request();
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Json(complete(req))
}

/// Answers after a normally distributed delay around `mean_ms`.
#[debug_handler]
pub async fn jitter(
    Path(mean_ms): Path<u64>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, StatusCode> {
    record_request();
    let delay_ms = {
        let mean = mean_ms as f64;
        let normal = Normal::new(mean, mean / 4.).map_err(|_| StatusCode::BAD_REQUEST)?;
        normal.sample(&mut rand::thread_rng()).max(0.)
    };
    tokio::time::sleep(Duration::from_secs_f64(delay_ms / 1e3)).await;
    Ok(Json(complete(req)))
}

lazy_static! {
    static ref FAIL_MAP: Arc<RwLock<HashMap<String, Arc<AtomicU64>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Every `every`-th request of a scenario fails with a 503.
#[debug_handler]
pub async fn fail_every(
    Path((every, delay_ms, scenario_name)): Path<(u64, u64, String)>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, StatusCode> {
    record_request();
    if every == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let read = FAIL_MAP
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .get(&scenario_name)
        .cloned();
    let calls = match read {
        Some(calls) => calls,
        None => FAIL_MAP
            .write()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .entry(scenario_name)
            .or_default()
            .clone(),
    };

    let n = calls.fetch_add(1, Ordering::Relaxed) + 1;
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    if n % every == 0 {
        debug!("Injected failure on call {n}");
        counter!("mock-backend.injected_failures").increment(1);
        Err(StatusCode::SERVICE_UNAVAILABLE)
    } else {
        Ok(Json(complete(req)))
    }
}

lazy_static! {
    static ref LIMITED_MAP: Arc<RwLock<HashMap<String, Arc<DefaultDirectRateLimiter>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Rejects requests over `max_rps` for a scenario with a 429.
#[debug_handler]
pub async fn limited(
    Path((max_rps, delay_ms, scenario_name)): Path<(u32, u64, String)>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, StatusCode> {
    record_request();
    let limiter = {
        let read = LIMITED_MAP
            .read()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .get(&scenario_name)
            .cloned();
        match read {
            Some(limiter) => limiter,
            None => {
                let limiter = Arc::new(rate_limiter(max_rps).ok_or(StatusCode::BAD_REQUEST)?);
                LIMITED_MAP
                    .write()
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                    .entry(scenario_name)
                    .or_insert(limiter)
                    .clone()
            }
        }
    };

    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    match limiter.check() {
        Ok(_) => Ok(Json(complete(req))),
        Err(_) => {
            debug!("Rate limited");
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

/// Answers immediately with no text.
#[debug_handler]
pub async fn empty(Json(req): Json<CompletionRequest>) -> Json<CompletionResponse> {
    record_request();
    Json(CompletionResponse {
        model: req.model,
        text: String::new(),
    })
}

/** Utils **/

pub fn rate_limiter(rps: u32) -> Option<DefaultDirectRateLimiter> {
    NonZeroU32::new(rps).map(|rps| RateLimiter::direct(Quota::per_second(rps)))
}

/// Echo the prompt; any non-zero temperature adds a random suffix.
fn complete(req: CompletionRequest) -> CompletionResponse {
    let text = if req.temperature > 0. {
        format!("echo: {} ({})", req.prompt, rand::random::<u32>())
    } else {
        format!("echo: {}", req.prompt)
    };
    CompletionResponse {
        model: req.model,
        text,
    }
}

fn record_request() {
    counter!("mock-backend.requests").increment(1);
    RPS_MEASURE.fetch_add(1, Ordering::Relaxed);
}

/** RPS Printer **/

static RPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn rps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = RPS_MEASURE.swap(0, Ordering::Relaxed);
        gauge!("mock-backend.rps").set(requests as f64);
        println!("{requests} RPS");
    }
}
