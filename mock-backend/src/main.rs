use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_backend=debug,tower_http=info")),
        )
        .init();

    PrometheusBuilder::new()
        .with_http_listener("0.0.0.0:8003".parse::<SocketAddr>()?)
        .install()
        .context("installing prometheus exporter")?;

    tokio::spawn(mock_backend::rps_measure_task());

    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    mock_backend::run(addr).await
}
