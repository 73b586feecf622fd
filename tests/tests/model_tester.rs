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
    #[ntest::timeout(30_000)]
    async fn full_suite_against_mock() {
        init().await;

        let config = HarnessConfig {
            performance_threshold: Duration::from_millis(500),
            concurrent_requests: 5,
            ..HarnessConfig::default()
        };
        let mut tester = ModelTester::new(Arc::new(backend("delay/ms/20")), config);

        let inference = tester.test_inference("What is the capital of France?").await;
        assert_eq!(inference.status, TestStatus::Passed);

        let performance = tester
            .test_performance(&["Hello", "What is AI?", "Tell me a joke"], 15)
            .await;
        assert_eq!(performance.status, TestStatus::Passed);
        assert!(performance.score.unwrap() >= 20.);

        // Temperature zero gets the same answer every time from the mock.
        let consistency = tester.test_prompt_consistency("Name a prime", 4).await;
        assert_eq!(consistency.score, Some(1.));

        let summary = tester.summary();
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.pass_rate, 1.);
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn empty_and_failing_backends() {
        init().await;

        let mut tester = ModelTester::new(Arc::new(backend("empty")), HarnessConfig::default());
        assert_eq!(
            tester.test_inference("Hello").await.status,
            TestStatus::Failed
        );

        let mut tester = ModelTester::new(
            Arc::new(backend("fail/every/1/delay/ms/1/scenario/empty_and_failing_backends")),
            HarnessConfig::default(),
        );
        assert_eq!(tester.test_inference("Hello").await.status, TestStatus::Error);

        let performance = tester.test_performance(&["Hello"], 5).await;
        assert_eq!(performance.status, TestStatus::Failed);
        assert_eq!(performance.metadata.unwrap()["failed_requests"], 5);
    }
}
