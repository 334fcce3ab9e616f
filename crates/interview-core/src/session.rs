use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use code_runner::{CodeRunner, Interpreter, RunResult, RunnerError, TestSpec};
use interview_types::events::{
    CodeUpdateEvent, ProcessFrameEvent, ProcessUserTextEvent, UserSilentEvent,
    UserSpeakingStartEvent, UserTypingEvent,
};
use interview_types::{ClientEvent, Question, ServerEvent, SessionConfig};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::activity::ActivityClock;
use crate::arbitrator::{AudioArbitrator, SpeakingState};
use crate::channel::SessionChannel;
use crate::frames::FrameSampler;
use crate::segmenter::UtteranceSegmenter;
use crate::settings::SessionSettings;
use crate::typing::{TypingSignal, typing_timestamp};
use crate::vad::{EnergyVad, VadEdge};
use crate::watchdog::SilenceWatchdog;
use crate::{Command, Input};

/// Shortest period the session's timers accept.
const MIN_TICK: Duration = Duration::from_millis(1);

/// One live interview.
///
/// Owns every piece of session state and mutates it from a single loop, so
/// handlers run to completion one at a time and need no locks. Code runs are
/// the only work moved off the loop; their results come back as events.
pub struct InterviewSession<C, I> {
    channel: C,
    runner: Arc<CodeRunner<I>>,
    frames: FrameSampler,
    settings: SessionSettings,
    config: SessionConfig,
    command_tx: mpsc::Sender<Command>,

    clock: ActivityClock,
    arbitrator: AudioArbitrator,
    vad: EnergyVad,
    segmenter: UtteranceSegmenter,
    typing: TypingSignal,
    watchdog: SilenceWatchdog,

    mic_available: bool,
    code: String,
    question: Option<Question>,
    run_in_flight: bool,
}

impl<C, I> InterviewSession<C, I>
where
    C: SessionChannel,
    I: Interpreter + 'static,
{
    pub fn new(
        channel: C,
        runner: Arc<CodeRunner<I>>,
        frames: FrameSampler,
        settings: SessionSettings,
        config: SessionConfig,
        command_tx: mpsc::Sender<Command>,
    ) -> Self {
        Self {
            channel,
            runner,
            frames,
            clock: ActivityClock::new(Instant::now()),
            arbitrator: AudioArbitrator::new(),
            vad: EnergyVad::new(settings.vad_threshold_db, settings.vad_frame),
            segmenter: UtteranceSegmenter::new(settings.utterance_quiet),
            typing: TypingSignal::new(settings.typing_interval),
            watchdog: SilenceWatchdog::new(settings.silence_threshold),
            settings,
            config,
            command_tx,
            mic_available: true,
            code: String::new(),
            question: None,
            run_in_flight: false,
        }
    }

    /// Runs the session until `Input::Stop` arrives or the input channel closes.
    ///
    /// A disconnected backend is reported once and does not end the session.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<Input>) -> Result<()> {
        let start = Instant::now();
        self.clock.touch(start);

        tracing::info!(
            difficulty = %self.config.difficulty,
            topic = %self.config.topic,
            persona = %self.config.persona,
            "Starting interview session"
        );
        self.send(ClientEvent::StartSession(self.config.clone())).await;
        let mut server_events = self
            .channel
            .server_events()
            .await
            .context("Failed to get server events channel")?;
        let mut server_open = true;

        let (run_tx, mut run_rx) = mpsc::channel::<Result<RunResult, RunnerError>>(1);

        // A zero period would panic the interval.
        let watchdog_tick = self.settings.watchdog_tick.max(MIN_TICK);
        let frame_interval = self.settings.frame_interval.max(MIN_TICK);
        let mut watchdog = tokio::time::interval_at(start + watchdog_tick, watchdog_tick);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut frame_ticks = tokio::time::interval_at(start + frame_interval, frame_interval);
        frame_ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let utterance_deadline = self.segmenter.deadline();
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(Input::Stop) | None => break,
                    Some(input) => self.handle_input(input, &run_tx).await,
                },
                event = server_events.recv(), if server_open => match event {
                    Some(event) => self.handle_server_event(event).await,
                    None => {
                        tracing::warn!("Session channel closed");
                        server_open = false;
                        self.emit(Command::ChannelClosed).await;
                    }
                },
                _ = watchdog.tick() => self.on_watchdog_tick(Instant::now()).await,
                _ = frame_ticks.tick() => self.on_frame_tick().await,
                _ = sleep_until(utterance_deadline) => self.on_utterance_deadline(Instant::now()).await,
                Some(outcome) = run_rx.recv() => self.on_run_finished(outcome).await,
            }
        }

        tracing::info!("Interview session ending");
        self.segmenter.reset();
        self.arbitrator.clear_pending();
        if let Err(e) = self.channel.close().await {
            tracing::warn!("Failed to close session channel: {:?}", e);
        }
        Ok(())
    }

    async fn handle_input(
        &mut self,
        input: Input,
        run_tx: &mpsc::Sender<Result<RunResult, RunnerError>>,
    ) {
        let now = Instant::now();
        match input {
            Input::Audio {
                samples,
                sample_rate,
            } => {
                // The microphone is deaf while the interviewer talks.
                if !self.mic_available || self.arbitrator.state() == SpeakingState::AiSpeaking {
                    return;
                }
                for edge in self.vad.push(&samples, sample_rate) {
                    self.on_vad_edge(edge, now).await;
                }
            }
            Input::MicUnavailable(reason) => {
                if !self.mic_available {
                    tracing::debug!("Microphone already unavailable: {}", reason);
                    return;
                }
                tracing::warn!("Microphone unavailable, voice detection disabled: {}", reason);
                self.mic_available = false;
                self.vad.reset();
                // A lost device cannot report the end of speech; close the turn here.
                if self.arbitrator.state() == SpeakingState::UserSpeaking {
                    self.on_vad_edge(VadEdge::SpeakingStopped, now).await;
                }
            }
            Input::Edit(code) => {
                self.code = code;
                if self.typing.on_edit(&mut self.clock, now) {
                    self.send(ClientEvent::UserTyping(UserTypingEvent::new(typing_timestamp())))
                        .await;
                }
            }
            Input::Transcript(delta) => {
                if self.segmenter.push(&delta, now) {
                    tracing::trace!("Pending utterance: {:?}", self.segmenter.pending());
                }
            }
            Input::ResetTranscript => self.segmenter.reset(),
            Input::PlaybackFinished => {
                if self.arbitrator.state() != SpeakingState::AiSpeaking {
                    tracing::debug!("Playback finished while not speaking, ignoring");
                    return;
                }
                match self.arbitrator.playback_finished() {
                    Some(text) => self.start_playback(text).await,
                    None => self.emit(Command::SpeakingChanged(SpeakingState::Idle)).await,
                }
            }
            Input::Run => self.start_run(run_tx).await,
            Input::Submit => {
                tracing::info!("Submitting code ({} bytes)", self.code.len());
                self.send(ClientEvent::CodeUpdate(CodeUpdateEvent::new(&self.code)))
                    .await;
            }
            // Handled by the loop.
            Input::Stop => {}
        }
    }

    async fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::SessionData(data) => {
                if let Some(persona) = data.persona() {
                    self.config.persona = persona.to_string();
                }
                let question = data.into_question();
                tracing::info!(
                    "Received question: {}",
                    question.title.as_deref().unwrap_or("<untitled>")
                );
                if let Some(starter) = &question.starter_code {
                    self.code = starter.clone();
                }
                self.question = Some(question.clone());
                self.emit(Command::ShowQuestion(question)).await;
            }
            ServerEvent::AiTextResponse(response) => {
                self.request_playback(response.text().to_string()).await;
            }
            ServerEvent::AiNudge(nudge) => {
                tracing::info!("Nudge from interviewer: {}", nudge.message());
                self.clock.touch(Instant::now());
                self.emit(Command::Nudge {
                    persona: self.config.persona.clone(),
                    message: nudge.message().to_string(),
                })
                .await;
                self.request_playback(nudge.message().to_string()).await;
            }
        }
    }

    async fn on_vad_edge(&mut self, edge: VadEdge, now: Instant) {
        match edge {
            VadEdge::SpeakingStarted => {
                if self.arbitrator.user_started() {
                    tracing::debug!("User started speaking");
                    self.clock.touch(now);
                    self.emit(Command::SpeakingChanged(SpeakingState::UserSpeaking))
                        .await;
                    self.send(ClientEvent::UserSpeakingStart(UserSpeakingStartEvent::new()))
                        .await;
                }
            }
            VadEdge::SpeakingStopped => {
                if self.arbitrator.state() != SpeakingState::UserSpeaking {
                    return;
                }
                tracing::debug!("User stopped speaking");
                self.clock.touch(now);
                match self.arbitrator.user_stopped() {
                    Some(text) => self.start_playback(text).await,
                    None => self.emit(Command::SpeakingChanged(SpeakingState::Idle)).await,
                }
            }
        }
    }

    async fn request_playback(&mut self, text: String) {
        if let Some(text) = self.arbitrator.request_playback(text) {
            self.start_playback(text).await;
        }
    }

    async fn start_playback(&mut self, text: String) {
        // Self-voice must not count towards the next user edge.
        self.vad.reset();
        self.emit(Command::SpeakingChanged(SpeakingState::AiSpeaking))
            .await;
        self.emit(Command::SpeakText(text)).await;
    }

    async fn on_watchdog_tick(&mut self, now: Instant) {
        if let Some(duration) = self
            .watchdog
            .tick(&mut self.clock, self.arbitrator.state(), now)
        {
            tracing::info!("User silent for {:.1}s", duration);
            self.send(ClientEvent::UserSilent(UserSilentEvent::new(duration)))
                .await;
        }
    }

    async fn on_frame_tick(&mut self) {
        if let Some(image) = self.frames.sample() {
            self.send(ClientEvent::ProcessFrame(ProcessFrameEvent::new(&image)))
                .await;
        }
    }

    async fn on_utterance_deadline(&mut self, now: Instant) {
        if let Some(text) = self.segmenter.poll(now) {
            tracing::info!("User said: \"{}\"", text);
            self.clock.touch(now);
            self.send(ClientEvent::ProcessUserText(ProcessUserTextEvent::new(&text)))
                .await;
        }
    }

    async fn start_run(&mut self, run_tx: &mpsc::Sender<Result<RunResult, RunnerError>>) {
        if self.run_in_flight {
            tracing::info!("Run requested while another is in flight");
            self.emit(Command::RunRejected(RunnerError::Busy.to_string()))
                .await;
            return;
        }
        self.run_in_flight = true;
        self.emit(Command::RunStarted).await;

        let spec = self
            .question
            .as_ref()
            .map(|q| TestSpec::new(q.test_case.as_deref(), q.meta_data.as_deref()))
            .unwrap_or_default();
        let source = self.code.clone();
        let runner = self.runner.clone();
        let run_tx = run_tx.clone();
        tokio::spawn(async move {
            let outcome = runner.run(&source, &spec).await;
            if run_tx.send(outcome).await.is_err() {
                tracing::debug!("Session ended before the run finished");
            }
        });
    }

    async fn on_run_finished(&mut self, outcome: Result<RunResult, RunnerError>) {
        self.run_in_flight = false;
        match outcome {
            Ok(result) => self.emit(Command::RunFinished(result)).await,
            Err(e) => self.emit(Command::RunRejected(e.to_string())).await,
        }
    }

    async fn send(&self, event: ClientEvent) {
        let kind = event.kind();
        if let Err(e) = self.channel.send(event).await {
            tracing::warn!("Failed to send {} event: {:?}", kind, e);
        }
    }

    async fn emit(&self, command: Command) {
        if let Err(e) = self.command_tx.send(command).await {
            tracing::warn!("Failed to send command to runtime: {:?}", e);
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
