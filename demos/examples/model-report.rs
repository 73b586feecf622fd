use anyhow::Result;
use assay::prelude::*;
use demos::backend;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("assay=info")
        .init();

    let config = HarnessConfig::from_env()?;
    let report_dir = config.report_output_dir.clone();
    let mut tester = ModelTester::new(Arc::new(backend("jitter/ms/30")), config);

    tester.test_inference("What is the capital of France?").await;
    tester
        .test_performance(&["Hello", "What is AI?", "Tell me a joke."], 50)
        .await;
    tester
        .test_prompt_consistency("Name the largest planet.", 5)
        .await;

    let summary = tester.summary();
    let report = serde_json::to_string_pretty(&summary)?;

    tokio::fs::create_dir_all(&report_dir).await?;
    let path = Path::new(&report_dir).join("summary.json");
    tokio::fs::write(&path, &report).await?;

    println!(
        "{}/{} passed ({:.0}%), report written to {}",
        summary.passed,
        summary.total_tests,
        summary.pass_rate * 100.,
        path.display()
    );
    Ok(())
}
