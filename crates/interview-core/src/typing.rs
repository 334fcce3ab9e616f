use std::time::Duration;

use tokio::time::Instant;

use crate::activity::ActivityClock;

/// Rate-limits "user is typing" notifications.
///
/// Every edit counts as activity; only edits more than `interval` after the
/// last notification produce a new one.
#[derive(Debug)]
pub struct TypingSignal {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl TypingSignal {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    /// Records an edit. Returns whether a notification should go out now.
    pub fn on_edit(&mut self, clock: &mut ActivityClock, now: Instant) -> bool {
        clock.touch(now);
        let due = self
            .last_sent
            .is_none_or(|sent| now.saturating_duration_since(sent) > self.interval);
        if due {
            self.last_sent = Some(now);
        }
        due
    }
}

/// Wall-clock timestamp carried by `user_typing`, in epoch milliseconds.
pub fn typing_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
