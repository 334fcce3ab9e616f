use std::time::Duration;

/// Timing and threshold knobs for one interview session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Silence longer than this raises `user_silent`.
    pub silence_threshold: Duration,
    /// Period of the silence watchdog.
    pub watchdog_tick: Duration,
    /// Energy above which a frame counts as voiced, in dBFS.
    pub vad_threshold_db: f32,
    /// Length of one VAD analysis frame.
    pub vad_frame: Duration,
    /// Quiet period after the last transcript delta before an utterance is final.
    pub utterance_quiet: Duration,
    /// Minimum gap between two `user_typing` notifications.
    pub typing_interval: Duration,
    /// Camera sampling period.
    pub frame_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            silence_threshold: Duration::from_secs(50),
            watchdog_tick: Duration::from_secs(1),
            vad_threshold_db: -50.0,
            vad_frame: Duration::from_millis(50),
            utterance_quiet: Duration::from_secs(2),
            typing_interval: Duration::from_millis(500),
            frame_interval: Duration::from_secs(1),
        }
    }
}

impl SessionSettings {
    pub fn with_silence_threshold(mut self, threshold: Duration) -> Self {
        self.silence_threshold = threshold;
        self
    }

    pub fn with_vad_threshold_db(mut self, threshold: f32) -> Self {
        self.vad_threshold_db = threshold;
        self
    }

    pub fn with_utterance_quiet(mut self, quiet: Duration) -> Self {
        self.utterance_quiet = quiet;
        self
    }

    pub fn with_typing_interval(mut self, interval: Duration) -> Self {
        self.typing_interval = interval;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}
