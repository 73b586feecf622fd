mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use assay::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    #[ntest::timeout(60_000)]
    async fn ramp_against_http_backend() {
        init().await;

        let backend = Arc::new(backend("delay/ms/10"));
        let request = InferenceRequest::from_config(&HarnessConfig::default(), "Hello");

        let timeline = run_stress_test(
            workload(backend, request),
            Duration::from_secs(5),
            Duration::from_secs(2),
            8,
        )
        .await
        .unwrap();

        let counts = timeline.request_counts();
        assert!(counts.len() >= 2);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
        assert_eq!(counts.last(), Some(&80));

        for step in timeline.iter() {
            assert_eq!(step.metrics.failed_requests, 0);
        }
    }

    #[tokio::test]
    #[ntest::timeout(60_000)]
    async fn rate_limit_shows_up_as_errors() {
        init().await;

        let backend = Arc::new(backend(
            "limited/50/delay/ms/5/scenario/rate_limit_shows_up_as_errors",
        ));
        let request = InferenceRequest::from_config(&HarnessConfig::default(), "Hello");

        let timeline = stress_test(workload(backend, request))
            .duration(Duration::from_secs(3))
            .ramp_up(Duration::from_secs(1))
            .max_concurrency(20)
            .await
            .unwrap();

        let last = timeline.steps().last().unwrap();
        assert_eq!(last.concurrency, 20);
        assert!(dbg!(last.metrics.error_rate()) > 0.);
    }
}
