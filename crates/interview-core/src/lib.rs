pub mod activity;
pub mod arbitrator;
pub mod channel;
pub mod frames;
pub mod segmenter;
pub mod session;
pub mod settings;
pub mod typing;
pub mod vad;
pub mod watchdog;

use arbitrator::SpeakingState;
use code_runner::RunResult;
use interview_types::Question;

pub use session::InterviewSession;
pub use settings::SessionSettings;

/// Side effects the session asks the runtime to carry out.
///
/// The session decides; the runtime renders, plays audio and reports back
/// through [`Input`].
#[derive(Debug, Clone)]
pub enum Command {
    /// A new problem arrived from the backend.
    ShowQuestion(Question),
    /// Play the given text as synthesized speech, then report `PlaybackFinished`.
    SpeakText(String),
    /// The owner of the audio path changed.
    SpeakingChanged(SpeakingState),
    /// The interviewer nudged the candidate.
    Nudge { persona: String, message: String },
    RunStarted,
    RunFinished(RunResult),
    /// A run was refused, e.g. because one is already in flight.
    RunRejected(String),
    /// The backend went away. Local features keep working.
    ChannelClosed,
}

/// Everything the runtime feeds into the session.
#[derive(Debug, Clone)]
pub enum Input {
    /// A chunk of mono microphone samples.
    Audio { samples: Vec<f32>, sample_rate: u32 },
    /// The microphone could not be opened; voice detection stays idle.
    MicUnavailable(String),
    /// The editor content changed.
    Edit(String),
    /// A transcript fragment from speech recognition.
    Transcript(String),
    ResetTranscript,
    PlaybackFinished,
    /// Run the current editor content against the sample case.
    Run,
    /// Send the current editor content to the interviewer.
    Submit,
    Stop,
}
