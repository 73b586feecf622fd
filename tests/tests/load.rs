mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use assay::prelude::*;
    use std::sync::Arc;

    fn request(prompt: &str) -> InferenceRequest {
        InferenceRequest::from_config(&HarnessConfig::default(), prompt)
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn fixed_delay_all_succeed() {
        init().await;

        let backend = Arc::new(backend("delay/ms/50"));
        let metrics = run_load_test(workload(backend, request("What is AI?")), 20, 5)
            .await
            .unwrap();

        assert_eq!(metrics.total_requests, 20);
        assert_eq!(metrics.successful_requests, 20);
        assert_eq!(metrics.failed_requests, 0);
        assert!(dbg!(metrics.avg_latency_ms) >= 50.);
        assert!(metrics.avg_latency_ms < 250.);
        assert!(metrics.min_latency_ms <= metrics.p50_latency_ms);
        assert!(metrics.p50_latency_ms <= metrics.p95_latency_ms);
        assert!(metrics.p95_latency_ms <= metrics.p99_latency_ms);
        assert!(metrics.p99_latency_ms <= metrics.max_latency_ms);
        assert!(metrics.throughput_rps > 0.);
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn injected_failures_are_counted() {
        init().await;

        let backend = Arc::new(backend(
            "fail/every/4/delay/ms/5/scenario/injected_failures_are_counted",
        ));
        let metrics = run_load_test(workload(backend, request("Hello")), 40, 4)
            .await
            .unwrap();

        assert_eq!(metrics.total_requests, 40);
        assert_eq!(metrics.failed_requests, 10);
        assert_eq!(metrics.successful_requests, 30);
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn rate_limited_backend() {
        init().await;

        let backend = Arc::new(backend("limited/20/delay/ms/1/scenario/rate_limited_backend"));
        let metrics = run_load_test(workload(backend, request("Hello")), 200, 20)
            .await
            .unwrap();

        assert_eq!(
            metrics.successful_requests + metrics.failed_requests,
            metrics.total_requests
        );
        assert!(dbg!(metrics.failed_requests) > 0);
        assert!(metrics.successful_requests > 0);
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn jittered_latencies_stay_ordered() {
        init().await;

        let backend = Arc::new(backend("jitter/ms/20"));
        let metrics = LoadTester::default()
            .run(workload(backend, request("Hello")), 100, 10)
            .await
            .unwrap();

        assert_eq!(metrics.successful_requests, 100);
        assert!(metrics.min_latency_ms <= metrics.p50_latency_ms);
        assert!(metrics.p50_latency_ms <= metrics.p95_latency_ms);
        assert!(metrics.p95_latency_ms <= metrics.p99_latency_ms);
        assert!(metrics.p99_latency_ms <= metrics.max_latency_ms);
    }

    #[test]
    #[ntest::timeout(30_000)]
    fn mock_backend_outlives_first_runtime() {
        let first = tokio::runtime::Runtime::new().unwrap();
        first.block_on(init());
        drop(first);

        let second = tokio::runtime::Runtime::new().unwrap();
        let metrics = second
            .block_on(async {
                let backend = Arc::new(backend("delay/ms/5"));
                run_load_test(workload(backend, request("Still there?")), 10, 2).await
            })
            .unwrap();

        assert_eq!(metrics.successful_requests, 10);
        assert_eq!(metrics.failed_requests, 0);
    }
}
