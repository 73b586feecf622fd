//! Background resource sampling for load tests.
mod probe;
mod timer;

pub use probe::{ProcessProbe, ResourceProbe};

use assay_core::ResourceSample;
use metrics_util::AtomicBucket;
use std::sync::Arc;
use std::time::Duration;
use timer::Timer;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Samples process resource usage on a fixed interval until told to stop.
///
/// Samples land in a lock-free bucket which the load test reads once the run is over; the
/// workers never touch it. Probe failures are dropped.
pub(crate) struct ResourceSampler {
    samples: Arc<AtomicBucket<ResourceSample>>,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ResourceSampler {
    pub fn spawn(probe: Arc<dyn ResourceProbe>, interval: Duration) -> Self {
        let samples = Arc::new(AtomicBucket::new());
        let (stop, mut stop_rx) = oneshot::channel::<()>();

        let bucket = samples.clone();
        let handle = tokio::spawn(async move {
            let mut timer = Timer::new(interval);
            trace!("Sampling resources every {timer}");

            loop {
                tokio::select! {
                    biased;

                    // NOTE: A dropped sender also ends sampling.
                    _ = &mut stop_rx => break,

                    elapsed = timer.tick() => {
                        let probe = probe.clone();
                        match tokio::task::spawn_blocking(move || probe.sample()).await {
                            Ok(Ok(sample)) => {
                                trace!("Resource sample after {elapsed:?}: {sample:?}");
                                bucket.push(sample);
                            }
                            Ok(Err(err)) => trace!("Resource sample skipped: {err}"),
                            Err(err) => trace!("Resource probe panicked: {err}"),
                        }
                    }
                }
            }
        });

        Self {
            samples,
            stop,
            handle,
        }
    }

    /// Signal the sampler to stop and wait up to `timeout` for it.
    ///
    /// Returns whatever was collected, whether or not the task stopped in time.
    pub async fn stop(self, timeout: Duration) -> Vec<ResourceSample> {
        let Self {
            samples,
            stop,
            mut handle,
        } = self;

        let _ = stop.send(());

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("Resource sampler failed: {err}"),
            Err(_) => {
                warn!(
                    "Resource sampler did not stop within {}; using samples collected so far.",
                    humantime::format_duration(timeout)
                );
                handle.abort();
            }
        }

        samples.data()
    }
}
