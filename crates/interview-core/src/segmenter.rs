use std::time::Duration;

use tokio::time::Instant;

/// Turns a stream of transcript fragments into finished utterances.
///
/// Every fragment pushes the quiet deadline out again; the utterance is final
/// once the deadline passes with no new fragment. The deadline is polled by the
/// owner's event loop rather than armed as a timer here.
#[derive(Debug)]
pub struct UtteranceSegmenter {
    quiet: Duration,
    pending: String,
    deadline: Option<Instant>,
}

impl UtteranceSegmenter {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: String::new(),
            deadline: None,
        }
    }

    /// Appends a fragment and restarts the quiet period.
    ///
    /// Blank fragments are ignored and leave the deadline untouched. Returns
    /// whether the fragment was taken.
    pub fn push(&mut self, delta: &str, now: Instant) -> bool {
        let fragment = delta.trim();
        if fragment.is_empty() {
            return false;
        }
        if !self.pending.is_empty() {
            self.pending.push(' ');
        }
        self.pending.push_str(fragment);
        self.deadline = Some(now + self.quiet);
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Takes the finished utterance if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let text = std::mem::take(&mut self.pending);
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        }
    }

    /// Discards pending text without emitting it.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_after_uninterrupted_quiet() {
        // Arrange
        let mut segmenter = UtteranceSegmenter::new(ms(2000));
        let start = Instant::now();

        // Act
        segmenter.push("two sum", start);
        segmenter.push(" uses a hash map ", start + ms(1500));

        // Assert
        assert_eq!(segmenter.poll(start + ms(3000)), None);
        assert_eq!(segmenter.deadline(), Some(start + ms(3500)));
        assert_eq!(
            segmenter.poll(start + ms(3500)).as_deref(),
            Some("two sum uses a hash map")
        );
        assert_eq!(segmenter.pending(), "");
        assert_eq!(segmenter.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_delta_does_not_restart_timer() {
        let mut segmenter = UtteranceSegmenter::new(ms(2000));
        let start = Instant::now();

        assert!(segmenter.push("hello", start));
        assert!(!segmenter.push("   ", start + ms(1000)));

        assert_eq!(segmenter.deadline(), Some(start + ms(2000)));
        assert_eq!(segmenter.poll(start + ms(2000)).as_deref(), Some("hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_pending_text() {
        let mut segmenter = UtteranceSegmenter::new(ms(2000));
        let start = Instant::now();

        segmenter.push("never mind", start);
        segmenter.reset();

        assert_eq!(segmenter.poll(start + ms(5000)), None);
        assert_eq!(segmenter.pending(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_utterances_come_out_in_order() {
        let mut segmenter = UtteranceSegmenter::new(ms(2000));
        let start = Instant::now();

        segmenter.push("first", start);
        let first = segmenter.poll(start + ms(2000));
        segmenter.push("second", start + ms(2500));
        let second = segmenter.poll(start + ms(4500));

        assert_eq!(first.as_deref(), Some("first"));
        assert_eq!(second.as_deref(), Some("second"));
    }
}
