use anyhow::Result;
use assay::prelude::*;
use demos::backend;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("assay=debug")
        .init();

    PrometheusBuilder::new()
        .with_http_listener("0.0.0.0:8002".parse::<SocketAddr>()?)
        .install()?;

    let config = HarnessConfig::from_env()?;
    let prompts = ["Hello", "What is AI?", "Summarize the French revolution."]
        .iter()
        .map(|p| InferenceRequest::from_config(&config, p))
        .collect();
    let backend = Arc::new(backend("limited/500/delay/ms/20/scenario/stress-ramp"));

    let timeline = stress_test(rotating_workload(backend, prompts))
        .duration(Duration::from_secs(60))
        .ramp_up(Duration::from_secs(30))
        .max_concurrency(40)
        .await?;

    for step in timeline.iter() {
        println!(
            "concurrency {:>3}: {:>5} requests, {:>6.1} rps, p95 {:>7.2}ms, error rate {:.2}",
            step.concurrency,
            step.metrics.total_requests,
            step.metrics.throughput_rps,
            step.metrics.p95_latency_ms,
            step.metrics.error_rate(),
        );
    }
    Ok(())
}
