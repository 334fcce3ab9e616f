//! UI bridge: JSON lines in on stdin, JSON lines out on stdout.
//!
//! Events use `{"event": "<name>", "data": {...}}` (client -> UI).
//! Commands use `{"command": "<name>", ...}` (UI -> client).
//! Logs go to stderr so stdout carries nothing but events.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use code_runner::RunResult;
use interview_core::Command;
use interview_types::Question;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// All events emitted to the UI via stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum UiEvent {
    Question(Question),
    Speak { text: String },
    Speaking { state: String },
    RunStarted {},
    RunResult(RunResult),
    RunRejected { reason: String },
    Nudge { persona: String, message: String },
    ChannelClosed {},
    Error { message: String },
}

impl From<Command> for UiEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::ShowQuestion(question) => Self::Question(question),
            Command::SpeakText(text) => Self::Speak { text },
            Command::SpeakingChanged(state) => Self::Speaking {
                state: state.as_str().to_string(),
            },
            Command::Nudge { persona, message } => Self::Nudge { persona, message },
            Command::RunStarted => Self::RunStarted {},
            Command::RunFinished(result) => Self::RunResult(result),
            Command::RunRejected(reason) => Self::RunRejected { reason },
            Command::ChannelClosed => Self::ChannelClosed {},
        }
    }
}

/// All commands received from the UI via stdin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command")]
#[serde(rename_all = "snake_case")]
pub enum UiCommand {
    /// Full editor content after a change.
    Edit { code: String },
    /// Speech recognition fragment.
    Transcript { text: String },
    ResetTranscript {},
    /// Path of an encoded camera still.
    Frame { path: PathBuf },
    PlaybackFinished {},
    Run {},
    Submit {},
    Stop {},
}

/// Parses one stdin line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Emit a `UiEvent` as a JSON line on stdout and flush.
pub fn emit_event(event: &UiEvent) {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
            return;
        }
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // The UI may already be gone.
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}

pub fn emit_error(message: &str) {
    emit_event(&UiEvent::Error {
        message: message.to_string(),
    });
}

/// Spawns a blocking thread that reads JSON lines from stdin and forwards the
/// parsed commands. The thread exits when stdin closes or the receiver is
/// dropped.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<UiCommand> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("stdin read error: {}", e);
                    break;
                }
            };
            match parse_command(&text) {
                Ok(Some(cmd)) => {
                    tracing::debug!(?cmd, "Received command from UI");
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Invalid JSON command: {} (input: {})", e, text.trim());
                    emit_error(&format!("Invalid JSON command: {}", e));
                }
            }
        }
        tracing::debug!("stdin reader thread exiting");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_runner::RunKind;
    use interview_core::arbitrator::SpeakingState;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command(r#"{"command":"edit","code":"class Solution: pass"}"#).unwrap(),
            Some(UiCommand::Edit {
                code: "class Solution: pass".to_string()
            })
        );
        assert_eq!(
            parse_command(r#" {"command":"run"} "#).unwrap(),
            Some(UiCommand::Run {})
        );
        assert_eq!(
            parse_command(r#"{"command":"frame","path":"/tmp/cam.jpg"}"#).unwrap(),
            Some(UiCommand::Frame {
                path: PathBuf::from("/tmp/cam.jpg")
            })
        );
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command(r#"{"command":"dance"}"#).is_err());
        assert!(parse_command("not json").is_err());
    }

    #[test]
    fn test_event_shapes() {
        let event = UiEvent::from(Command::SpeakingChanged(SpeakingState::UserSpeaking));
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"speaking","data":{"state":"user_speaking"}}"#
        );

        let event = UiEvent::from(Command::RunFinished(RunResult::new(
            RunKind::Completed,
            "Your Output: [0, 1]\n",
        )));
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"run_result","data":{"kind":"completed","output":"Your Output: [0, 1]\n"}}"#
        );

        let event = UiEvent::from(Command::ChannelClosed);
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"channel_closed","data":{}}"#
        );
    }

    #[test]
    fn test_question_event_carries_problem_fields() {
        let question = Question::builder()
            .with_title("Two Sum")
            .with_starter_code("class Solution:\n    pass\n")
            .build();

        let json = serde_json::to_value(UiEvent::from(Command::ShowQuestion(question))).unwrap();

        assert_eq!(json["event"], "question");
        assert_eq!(json["data"]["title"], "Two Sum");
        assert_eq!(json["data"]["starter_code"], "class Solution:\n    pass\n");
    }
}
