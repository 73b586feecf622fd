use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Linear concurrency ramp for stress tests.
///
/// Concurrency climbs from 1 to `max_concurrency` over `ramp_up` and holds there afterwards.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RampController {
    ramp_up: Duration,
    max_concurrency: usize,
}

impl RampController {
    pub fn new(ramp_up: Duration, max_concurrency: usize) -> Self {
        Self {
            ramp_up,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn concurrency(&self, elapsed: Duration) -> usize {
        if elapsed >= self.ramp_up {
            return self.max_concurrency;
        }

        let progress = elapsed.as_secs_f64() / self.ramp_up.as_secs_f64();
        let concurrency = (progress * self.max_concurrency as f64).ceil() as usize;
        trace!("Ramp progress {progress:.2} -> concurrency {concurrency}");

        concurrency.clamp(1, self.max_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_linearly() {
        let ramp = RampController::new(Duration::from_secs(2), 10);

        assert_eq!(ramp.concurrency(Duration::ZERO), 1);
        assert_eq!(ramp.concurrency(Duration::from_millis(100)), 1);
        assert_eq!(ramp.concurrency(Duration::from_millis(500)), 3);
        assert_eq!(ramp.concurrency(Duration::from_secs(1)), 5);
        assert_eq!(ramp.concurrency(Duration::from_millis(1_900)), 10);
        assert_eq!(ramp.concurrency(Duration::from_secs(2)), 10);
        assert_eq!(ramp.concurrency(Duration::from_secs(60)), 10);
    }

    #[test]
    fn never_decreases() {
        let ramp = RampController::new(Duration::from_millis(750), 7);
        let levels: Vec<usize> = (0..100)
            .map(|ms| ramp.concurrency(Duration::from_millis(ms * 10)))
            .collect();

        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(levels[0], 1);
        assert_eq!(*levels.last().unwrap(), 7);
    }

    #[test]
    fn zero_ramp_is_full_load() {
        let ramp = RampController::new(Duration::ZERO, 4);
        assert_eq!(ramp.concurrency(Duration::ZERO), 4);
    }
}
