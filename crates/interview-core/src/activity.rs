use std::time::Duration;

use tokio::time::Instant;

/// When the user last did anything observable.
///
/// Every sensor edge touches the clock; only the silence watchdog reads it.
#[derive(Debug, Clone)]
pub struct ActivityClock {
    last_active: Instant,
}

impl ActivityClock {
    pub fn new(now: Instant) -> Self {
        Self { last_active: now }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_active = now;
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    pub fn silence(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }

    pub fn silence_seconds(&self, now: Instant) -> f64 {
        self.silence(now).as_secs_f64()
    }
}
