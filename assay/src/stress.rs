//! Stress tests: back-to-back load tests at rising concurrency.
use crate::controllers::RampController;
use crate::load_test::LoadTester;
use crate::sampler::ResourceProbe;
use assay_core::{ConfigError, LoadTestConfig, StressConfig, StressStep, StressTimeline};
use futures_util::future::BoxFuture;
use humantime::format_duration;
use std::fmt::Display;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Stress test builder.
///
/// Created with [`stress_test`]; `.await` it to run.
///
/// # Example
/// ```no_run
/// use assay::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), ConfigError> {
///     let timeline = stress_test(|| async {
///         tokio::time::sleep(Duration::from_millis(20)).await;
///         Ok::<_, BackendError>(())
///     })
///     .duration(Duration::from_secs(30))
///     .ramp_up(Duration::from_secs(10))
///     .max_concurrency(25)
///     .await?;
///
///     for step in timeline.iter() {
///         println!("{} -> {}", step.concurrency, step.metrics);
///     }
///     Ok(())
/// }
/// ```
pub struct StressTest<T> {
    work: T,
    config: StressConfig,
    probe: Option<Arc<dyn ResourceProbe>>,
}

/// Start building a stress test of `work` with the default settings (see [`StressConfig`]).
pub fn stress_test<T>(work: T) -> StressTest<T> {
    StressTest {
        work,
        config: StressConfig::default(),
        probe: None,
    }
}

impl<T> StressTest<T> {
    /// Total time to keep starting new steps. The step running when it elapses still finishes.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Time over which concurrency climbs to `max_concurrency`.
    pub fn ramp_up(mut self, ramp_up: Duration) -> Self {
        self.config.ramp_up = ramp_up;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Requests issued per unit of concurrency in each step.
    pub fn requests_per_step(mut self, requests_per_step: usize) -> Self {
        self.config.requests_per_step = requests_per_step;
        self
    }

    pub fn load_config(mut self, load: LoadTestConfig) -> Self {
        self.config.load = load;
        self
    }

    pub fn probe(mut self, probe: Arc<dyn ResourceProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }
}

impl<T, F, R, E> IntoFuture for StressTest<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    type Output = Result<StressTimeline, ConfigError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let mut tester = LoadTester::new(self.config.load);
        if let Some(probe) = self.probe {
            tester = tester.with_probe(probe);
        }
        Box::pin(run_stress(self.work, self.config, tester))
    }
}

/// Run a stress test with the default load test settings.
///
/// Concurrency ramps linearly from 1 to `max_concurrency` over `ramp_up`, then holds. Each
/// step is a load test of `concurrency * 10` requests. See [`StressTest`] for more control.
pub async fn run_stress_test<T, F, R, E>(
    work: T,
    duration: Duration,
    ramp_up: Duration,
    max_concurrency: usize,
) -> Result<StressTimeline, ConfigError>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    stress_test(work)
        .duration(duration)
        .ramp_up(ramp_up)
        .max_concurrency(max_concurrency)
        .await
}

#[instrument(name = "stress_test", skip_all, fields(max_concurrency = config.max_concurrency))]
async fn run_stress<T, F, R, E>(
    work: T,
    config: StressConfig,
    tester: LoadTester,
) -> Result<StressTimeline, ConfigError>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
{
    config.validate()?;
    info!("Running stress test with config {:?}", &config);

    let ramp = RampController::new(config.ramp_up, config.max_concurrency);
    let mut timeline = StressTimeline::new();
    let start = Instant::now();

    // NOTE: A step is never cut short, so the final step can run past `duration`.
    loop {
        let elapsed = start.elapsed();
        if elapsed >= config.duration {
            break;
        }

        let concurrency = ramp.concurrency(elapsed);
        let total_requests = concurrency.saturating_mul(config.requests_per_step);
        let metrics = tester
            .run(work.clone(), total_requests, concurrency)
            .await?;

        debug!(
            "Step {} at {} (concurrency {concurrency}): {metrics}",
            timeline.len(),
            format_duration(elapsed)
        );
        timeline.push(StressStep {
            concurrency,
            metrics,
        });
    }

    info!(
        "Stress test complete: {} steps in {}",
        timeline.len(),
        format_duration(start.elapsed())
    );
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::{ResourceSample, SamplerError};

    struct NullProbe;

    impl ResourceProbe for NullProbe {
        fn sample(&self) -> Result<ResourceSample, SamplerError> {
            Err(SamplerError::Unavailable("test"))
        }
    }

    fn sleepy(ms: u64) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Clone {
        move || {
            let fut: BoxFuture<'static, _> = Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            });
            fut
        }
    }

    #[tracing_test::traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn ramps_then_holds() {
        let max_concurrency = 10;
        let timeline = stress_test(sleepy(5))
            .duration(Duration::from_millis(1_500))
            .ramp_up(Duration::from_millis(600))
            .max_concurrency(max_concurrency)
            .probe(Arc::new(NullProbe))
            .await
            .unwrap();

        assert!(timeline.len() >= 2);

        let counts = timeline.request_counts();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
        assert_eq!(counts[0], 10);
        assert_eq!(*counts.last().unwrap(), max_concurrency * 10);

        for step in timeline.iter() {
            assert_eq!(step.metrics.total_requests, step.concurrency * 10);
            assert_eq!(step.metrics.successful_requests, step.metrics.total_requests);
            assert!((1..=max_concurrency).contains(&step.concurrency));
        }

        // Every step after the ramp runs at full concurrency.
        let held = timeline
            .iter()
            .skip_while(|s| s.concurrency < max_concurrency)
            .collect::<Vec<_>>();
        assert!(!held.is_empty());
        assert!(held.iter().all(|s| s.concurrency == max_concurrency));
    }

    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn last_step_is_not_truncated() {
        // Each step takes ~10 x 30ms, far longer than the whole stress test duration.
        let timeline = stress_test(sleepy(30))
            .duration(Duration::from_millis(50))
            .ramp_up(Duration::from_secs(10))
            .max_concurrency(4)
            .probe(Arc::new(NullProbe))
            .await
            .unwrap();

        assert_eq!(timeline.len(), 1);
        let step = &timeline.steps()[0];
        assert_eq!(step.concurrency, 1);
        assert_eq!(step.metrics.successful_requests, 10);
        assert!(step.metrics.total_duration_s >= 0.3);
    }

    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn zero_ramp_starts_at_max() {
        let timeline = stress_test(sleepy(1))
            .duration(Duration::from_millis(100))
            .ramp_up(Duration::ZERO)
            .max_concurrency(3)
            .requests_per_step(2)
            .probe(Arc::new(NullProbe))
            .await
            .unwrap();

        assert!(!timeline.is_empty());
        assert!(timeline
            .iter()
            .all(|s| s.concurrency == 3 && s.metrics.total_requests == 6));
    }

    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn failures_do_not_stop_the_ramp() {
        let timeline = stress_test(|| async { Err::<(), _>("overloaded") })
            .duration(Duration::from_millis(50))
            .ramp_up(Duration::from_millis(20))
            .max_concurrency(2)
            .probe(Arc::new(NullProbe))
            .await
            .unwrap();

        assert!(!timeline.is_empty());
        for step in timeline.iter() {
            assert_eq!(step.metrics.successful_requests, 0);
            assert_eq!(step.metrics.failed_requests, step.metrics.total_requests);
        }
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let res = run_stress_test(sleepy(1), Duration::from_secs(1), Duration::ZERO, 0).await;
        assert_eq!(res, Err(ConfigError::ZeroConcurrency));

        let res = run_stress_test(sleepy(1), Duration::ZERO, Duration::ZERO, 4).await;
        assert_eq!(res, Err(ConfigError::ZeroDuration));

        let res = stress_test(sleepy(1)).requests_per_step(0).await;
        assert_eq!(res, Err(ConfigError::ZeroRequestsPerStep));
    }
}
