pub mod client;
pub mod server;

pub use client::*;
pub use server::*;

/// Messages the client sends to the interview backend.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "start_session")]
    StartSession(crate::SessionConfig),
    #[serde(rename = "user_typing")]
    UserTyping(UserTypingEvent),
    #[serde(rename = "code_update")]
    CodeUpdate(CodeUpdateEvent),
    #[serde(rename = "user_silent")]
    UserSilent(UserSilentEvent),
    #[serde(rename = "user_speaking_start")]
    UserSpeakingStart(UserSpeakingStartEvent),
    #[serde(rename = "process_frame")]
    ProcessFrame(ProcessFrameEvent),
    #[serde(rename = "process_user_text")]
    ProcessUserText(ProcessUserTextEvent),
}

impl ClientEvent {
    /// Wire name of the event, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartSession(_) => "start_session",
            Self::UserTyping(_) => "user_typing",
            Self::CodeUpdate(_) => "code_update",
            Self::UserSilent(_) => "user_silent",
            Self::UserSpeakingStart(_) => "user_speaking_start",
            Self::ProcessFrame(_) => "process_frame",
            Self::ProcessUserText(_) => "process_user_text",
        }
    }
}

/// Messages the interview backend pushes to the client.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session_data")]
    SessionData(SessionDataEvent),
    #[serde(rename = "ai_text_response")]
    AiTextResponse(AiTextResponseEvent),
    #[serde(rename = "ai_nudge")]
    AiNudge(AiNudgeEvent),
}
