use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::mpsc::{self, Sender},
    thread,
};

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};

use page_reader::{
    narration::{PiperSynthesizer, DEFAULT_LOCALE, DEFAULT_RATE},
    state::AppState,
    util::logging,
    NarrationConfig, PiperNarrator, Reader, Session, SessionEvent,
};

#[derive(Debug, Parser)]
#[command(name = "page-reader", version, about = "Read documents aloud, line by line")]
struct Cli {
    /// Narration locale
    #[arg(long, env = "READER_LOCALE", default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Speaking rate (1.0 is natural pace)
    #[arg(long, env = "READER_RATE", default_value_t = DEFAULT_RATE)]
    rate: f32,

    /// Base URL of the PDF extraction service; the local script is used when unset
    #[arg(long, env = "READER_API_URL")]
    api_url: Option<String>,

    /// Piper voice model (.onnx); picked from the voices directory by locale otherwise
    #[arg(long, env = "READER_VOICE_MODEL")]
    voice: Option<PathBuf>,

    /// Document to open at start-up
    document: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = match logging::init(Path::new("logs")) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to initialise logger: {err:#}");
            None
        }
    };
    info!("Starting page-reader");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::initialise()?;
    let importer = state.importer(cli.api_url.as_deref())?;
    let voice = resolve_voice(&state, &cli);

    let (events, inbox) = mpsc::channel();
    let notify = events.clone();
    let narrator = PiperNarrator::spawn(
        PiperSynthesizer::from_env(),
        voice,
        state.output_dir().to_path_buf(),
        move |event| {
            let _ = notify.send(SessionEvent::Narration(event));
        },
    )
    .context("failed to start narration worker")?;
    spawn_input(events).context("failed to read console input")?;

    let reader = Reader::new(narrator, NarrationConfig::new(cli.locale, cli.rate));
    let mut session = Session::new(reader, importer, io::stdout().lock());
    if let Some(path) = &cli.document {
        session.open(path)?;
    }
    session.run(&inbox)?;
    Ok(())
}

/// An explicit `--voice` wins; otherwise the first installed voice for the
/// locale. Without one the reader still works, it just cannot speak.
fn resolve_voice(state: &AppState, cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.voice {
        if !path.exists() {
            warn!("Voice model {} does not exist", path.display());
        }
        return Some(path.clone());
    }
    match state.voices.find_for_locale(&cli.locale) {
        Ok(voice) => {
            info!("Using voice {}", voice.label);
            Some(voice.model_path)
        }
        Err(err) => {
            warn!(
                "{err} in {}; narration is disabled",
                state.voices.base_dir().display()
            );
            None
        }
    }
}

fn spawn_input(events: Sender<SessionEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if events.send(SessionEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = events.send(SessionEvent::InputClosed);
        })?;
    Ok(())
}
