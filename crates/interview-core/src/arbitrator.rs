use std::collections::VecDeque;

/// Who currently owns the audio path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeakingState {
    #[default]
    Idle,
    UserSpeaking,
    AiSpeaking,
}

impl SpeakingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::UserSpeaking => "user_speaking",
            Self::AiSpeaking => "ai_speaking",
        }
    }
}

/// Half-duplex gate between the microphone and synthesized speech.
///
/// The user and the interviewer never hold the audio path at the same time.
/// Playback requested while someone else is talking waits in arrival order
/// and is admitted when the path becomes idle.
#[derive(Debug, Default)]
pub struct AudioArbitrator {
    state: SpeakingState,
    pending: VecDeque<String>,
}

impl AudioArbitrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SpeakingState {
        self.state
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// A VAD start edge. Ignored while the interviewer is speaking.
    ///
    /// Returns whether the user now holds the path.
    pub fn user_started(&mut self) -> bool {
        match self.state {
            SpeakingState::Idle => {
                self.state = SpeakingState::UserSpeaking;
                true
            }
            SpeakingState::UserSpeaking | SpeakingState::AiSpeaking => false,
        }
    }

    /// A VAD stop edge. Returns the next playback admitted, if one was waiting.
    pub fn user_stopped(&mut self) -> Option<String> {
        if self.state != SpeakingState::UserSpeaking {
            return None;
        }
        self.state = SpeakingState::Idle;
        self.admit_next()
    }

    /// Queues `text` for playback and returns whatever may start right now.
    pub fn request_playback(&mut self, text: String) -> Option<String> {
        self.pending.push_back(text);
        if self.state == SpeakingState::Idle {
            self.admit_next()
        } else {
            tracing::debug!(
                state = self.state.as_str(),
                pending = self.pending.len(),
                "Playback deferred"
            );
            None
        }
    }

    /// Playback completed. Returns the next playback admitted, if any.
    pub fn playback_finished(&mut self) -> Option<String> {
        if self.state != SpeakingState::AiSpeaking {
            tracing::debug!("Ignoring playback completion in state {}", self.state.as_str());
            return None;
        }
        self.state = SpeakingState::Idle;
        self.admit_next()
    }

    /// Drops queued playback, for example when the session ends.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    fn admit_next(&mut self) -> Option<String> {
        let text = self.pending.pop_front()?;
        self.state = SpeakingState::AiSpeaking;
        Some(text)
    }
}
