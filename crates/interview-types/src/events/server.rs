use crate::Question;

/// `session_data` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionDataEvent {
    /// The problem selected for this session
    question: Question,

    /// Echo of the persona the session was started with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    persona: Option<String>,
}

impl SessionDataEvent {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            persona: None,
        }
    }

    pub fn with_persona(mut self, persona: &str) -> Self {
        self.persona = Some(persona.to_string());
        self
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn into_question(self) -> Question {
        self.question
    }

    pub fn persona(&self) -> Option<&str> {
        self.persona.as_deref()
    }
}

/// `ai_text_response` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AiTextResponseEvent {
    text: String,
}

impl AiTextResponseEvent {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `ai_nudge` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AiNudgeEvent {
    message: String,
}

impl AiNudgeEvent {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
