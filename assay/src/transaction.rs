use assay_core::{MetricLabels, RequestOutcome};
use futures_util::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

/// Invoke one unit of work and record how it went.
///
/// Errors and panics from `work` are captured as a failed outcome; nothing escapes.
pub(crate) async fn measure<T, F, R, E>(work: &T, labels: MetricLabels) -> RequestOutcome
where
    T: Fn() -> F,
    F: Future<Output = Result<R, E>>,
    E: Display,
{
    let start = Instant::now();
    let res = AssertUnwindSafe(async { work().await })
        .catch_unwind()
        .await;
    let latency = start.elapsed();

    let outcome = match res {
        Ok(Ok(_)) => RequestOutcome::Success { latency },
        Ok(Err(err)) => RequestOutcome::Failure {
            error: err.to_string(),
        },
        Err(panic) => RequestOutcome::Failure {
            error: panic_message(panic),
        },
    };

    #[cfg(feature = "metrics")]
    match &outcome {
        RequestOutcome::Success { latency } => {
            metrics::histogram!(labels.latency).record(latency.as_secs_f64());
            metrics::counter!(labels.success).increment(1);
        }
        RequestOutcome::Failure { .. } => {
            metrics::counter!(labels.error).increment(1);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = labels;

    outcome
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("work panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("work panicked: {msg}")
    } else {
        "work panicked".to_string()
    }
}
