use std::time::Duration;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub(crate) struct Timer {
    interval: Interval,
    last_tick: Option<Instant>,
    interval_dur: Duration,
}

impl Timer {
    pub fn new(interval_dur: Duration) -> Self {
        let interval_dur = interval_dur.max(MIN_INTERVAL);
        let mut interval = interval(interval_dur);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            last_tick: None,
            interval_dur,
        }
    }

    /// Wait for the next tick and return the time since the previous one.
    ///
    /// NOTE: The first tick completes instantly and reports zero elapsed time.
    pub async fn tick(&mut self) -> Duration {
        let next = self.interval.tick().await;
        let elapsed = self
            .last_tick
            .map(|last| next.duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(next);
        elapsed
    }
}

impl std::fmt::Display for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", humantime::format_duration(self.interval_dur))
    }
}
