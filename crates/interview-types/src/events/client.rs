/// `user_typing` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserTypingEvent {
    /// Wall-clock time of the edit, milliseconds since the Unix epoch
    timestamp: i64,
}

impl UserTypingEvent {
    pub fn new(timestamp: i64) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// `code_update` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CodeUpdateEvent {
    /// Full editor content at the time of submission
    code: String,
}

impl CodeUpdateEvent {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// `user_silent` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserSilentEvent {
    /// Seconds since the last observed user activity
    #[serde(rename = "duration")]
    duration_seconds: f64,
}

impl UserSilentEvent {
    pub fn new(duration_seconds: f64) -> Self {
        Self { duration_seconds }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }
}

/// `user_speaking_start` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserSpeakingStartEvent {}

impl UserSpeakingStartEvent {
    pub fn new() -> Self {
        Self {}
    }
}

/// `process_frame` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessFrameEvent {
    /// Base64 of the encoded still image
    image: String,
}

impl ProcessFrameEvent {
    pub fn new(image: &str) -> Self {
        Self {
            image: image.to_string(),
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

/// `process_user_text` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessUserTextEvent {
    /// A finalized utterance
    text: String,
}

impl ProcessUserTextEvent {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
