use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use code_runner::{CodeRunner, RunnerSettings};
use interview_core::frames::{FramePublisher, frame_slot};
use interview_core::{Command, Input, InterviewSession};
use interview_service::config::Config;
use interview_service::ipc::{self, UiCommand, UiEvent};
use interview_types::SessionConfig;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(version, about = "Mock coding interview client")]
struct Cli {
    /// Problem difficulty requested from the interviewer
    #[arg(long, default_value = "Medium")]
    difficulty: String,
    /// Problem topic requested from the interviewer
    #[arg(long, default_value = "Array")]
    topic: String,
    /// Interviewer persona
    #[arg(long, default_value = "Neutral")]
    persona: String,
    /// Name of the microphone to use instead of the default input
    #[arg(long)]
    input_device: Option<String>,
    /// Print the available input devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    // stdout belongs to the UI bridge.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    if args.list_devices {
        let devices = interview_native_utils::device::get_available_inputs()
            .context("Failed to enumerate input devices")?;
        println!("{}", devices);
        return Ok(());
    }

    tracing::info!("Configuration loaded successfully. Starting interview client...");

    // --- 4. Channels ---
    let (input_tx, input_rx) = mpsc::channel::<Input>(1024);
    let (command_tx, mut command_rx) = mpsc::channel::<Command>(32);

    // --- 5. Microphone ---
    // A missing microphone is not fatal; voice detection just stays idle.
    let _input_stream = match open_microphone(args.input_device.as_deref(), input_tx.clone()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!("Microphone unavailable: {:#}", e);
            if let Err(e) = input_tx.try_send(Input::MicUnavailable(e.to_string())) {
                tracing::warn!("Failed to report microphone failure: {:?}", e);
            }
            None
        }
    };

    // --- 6. Backend Connection ---
    let mut builder = session_client::Config::builder().with_url(&config.session_url);
    if let Some(token) = config.session_token.as_deref() {
        builder = builder.with_token(token);
    }
    let channel = session_client::connect(builder.build())
        .await
        .with_context(|| format!("Failed to connect to {}", config.session_url))?;

    // --- 7. Session ---
    let runner = Arc::new(CodeRunner::python(&RunnerSettings {
        program: config.python_bin.clone(),
        time_limit: config.run_time_limit,
    }));
    if !runner_available(&config.python_bin) {
        tracing::warn!("'{}' not found on PATH; code runs will fail", config.python_bin);
    }
    let (publisher, sampler) = frame_slot();
    let session = InterviewSession::new(
        channel,
        runner,
        sampler,
        config.session.clone(),
        SessionConfig::new(&args.difficulty, &args.topic, &args.persona),
        command_tx,
    );
    let session_handle = tokio::spawn(session.run(input_rx));

    // This task renders the session's side effects for the UI.
    let command_handler = tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            tracing::debug!(?command, "COMMAND RECEIVED");
            ipc::emit_event(&UiEvent::from(command));
        }
    });

    // This task turns UI commands into session inputs.
    let mut ui_rx = ipc::spawn_stdin_reader();
    let ui_handle = tokio::spawn(async move {
        while let Some(command) = ui_rx.recv().await {
            let input = match command {
                UiCommand::Frame { path } => {
                    forward_frame(&publisher, &path);
                    continue;
                }
                UiCommand::Edit { code } => Input::Edit(code),
                UiCommand::Transcript { text } => Input::Transcript(text),
                UiCommand::ResetTranscript {} => Input::ResetTranscript,
                UiCommand::PlaybackFinished {} => Input::PlaybackFinished,
                UiCommand::Run {} => Input::Run,
                UiCommand::Submit {} => Input::Submit,
                UiCommand::Stop {} => Input::Stop,
            };
            let stop = matches!(input, Input::Stop);
            if input_tx.send(input).await.is_err() {
                tracing::debug!("session input closed");
                return;
            }
            if stop {
                return;
            }
        }
        // stdin closed without an explicit stop.
        let _ = input_tx.send(Input::Stop).await;
    });

    tokio::select! {
        result = session_handle => {
            match result {
                Ok(Ok(())) => tracing::info!("Session finished"),
                Ok(Err(e)) => tracing::error!("Session failed: {:#}", e),
                Err(e) => tracing::error!("Session task panicked: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
        }
    }

    ui_handle.abort();
    command_handler.abort();
    Ok(())
}

/// Opens the microphone and forwards mono chunks into the session.
fn open_microphone(
    device_name: Option<&str>,
    input_tx: mpsc::Sender<Input>,
) -> Result<cpal::Stream> {
    use cpal::traits::DeviceTrait;

    let device = interview_native_utils::device::get_or_default_input(device_name)?;
    tracing::info!("Using input device: {:?}", device.name()?);

    let lost_tx = input_tx.clone();
    let stream = interview_native_utils::device::start_capture(
        &device,
        move |samples, sample_rate| {
            if let Err(e) = input_tx.try_send(Input::Audio {
                samples,
                sample_rate,
            }) {
                tracing::warn!("Failed to send audio data to session: {:?}", e);
            }
        },
        move |reason| {
            if let Err(e) = lost_tx.try_send(Input::MicUnavailable(reason)) {
                tracing::warn!("Failed to report microphone loss: {:?}", e);
            }
        },
    )?;
    Ok(stream)
}

fn runner_available(program: &str) -> bool {
    code_runner::PythonInterpreter::new(program).is_available()
}

fn forward_frame(publisher: &FramePublisher, path: &std::path::Path) {
    match interview_native_utils::frame::read_frame(path) {
        Ok(encoded) => publisher.publish(encoded),
        Err(e) => {
            tracing::warn!("Dropping frame: {:#}", e);
            ipc::emit_error(&format!("{:#}", e));
        }
    }
}
