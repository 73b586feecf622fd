use anyhow::Result;
use assay::prelude::*;
use demos::backend;
use std::sync::Arc;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("assay=debug")
        .init();

    let config = HarnessConfig::from_env()?;
    let request = InferenceRequest::from_config(&config, "What is the capital of France?");
    let backend = Arc::new(backend("jitter/ms/40"));

    let metrics = run_load_test(workload(backend, request), 200, config.concurrent_requests).await?;

    println!("{metrics}");
    println!("{}", serde_json::to_string_pretty(&metrics.rounded())?);
    Ok(())
}
