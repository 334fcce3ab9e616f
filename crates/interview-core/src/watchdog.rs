use std::time::Duration;

use tokio::time::Instant;

use crate::activity::ActivityClock;
use crate::arbitrator::SpeakingState;

/// Periodic silence check.
///
/// Each qualifying tick yields its own signal, so a silence that persists is
/// reported once per tick until some activity touches the clock.
#[derive(Debug, Clone)]
pub struct SilenceWatchdog {
    threshold: Duration,
}

impl SilenceWatchdog {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Evaluates one tick and returns the silence duration in seconds when it
    /// exceeds the threshold.
    ///
    /// A user who is speaking is active by definition: the clock is touched
    /// and the check skipped.
    pub fn tick(&self, clock: &mut ActivityClock, state: SpeakingState, now: Instant) -> Option<f64> {
        if state == SpeakingState::UserSpeaking {
            clock.touch(now);
            return None;
        }
        let silence = clock.silence(now);
        (silence > self.threshold).then(|| silence.as_secs_f64())
    }
}
