use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::Instant,
};

use log::{debug, error, warn};
use shlex::Shlex;
use thiserror::Error;

use crate::util::runtime::runtime_dir;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("voice model not found at {0}")]
    VoiceNotFound(PathBuf),
    #[error("failed to spawn Piper process: {0}")]
    SpawnFailure(#[from] std::io::Error),
    #[error("Piper exited with status {status}: {stderr}")]
    PiperFailure { status: i32, stderr: String },
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub model_path: PathBuf,
    pub output_path: PathBuf,
    pub length_scale: Option<f32>,
}

impl SynthesisRequest {
    /// Build a request speaking `text` at `rate` (1.0 is Piper's natural pace).
    pub fn new(text: &str, model_path: &Path, output_path: PathBuf, rate: f32) -> Self {
        Self {
            text: text.to_string(),
            model_path: model_path.to_path_buf(),
            output_path,
            length_scale: length_scale_for(rate),
        }
    }
}

/// Piper stretches speech by `length_scale`, the inverse of a speaking rate.
pub fn length_scale_for(rate: f32) -> Option<f32> {
    if !rate.is_finite() || rate <= 0.0 || (rate - 1.0).abs() < f32::EPSILON {
        None
    } else {
        Some(1.0 / rate)
    }
}

/// Renders text to a WAV file.
pub trait Synthesizer: Send {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), SynthesisError>;
}

/// Runs the Piper CLI, feeding the text on stdin.
///
/// The command is `READER_PIPER_COMMAND` (split shell-style) when set, then a
/// bundled `runtime/piper/piper`, then `piper` on the `PATH`, and finally
/// `python -m piper`.
#[derive(Debug, Clone, Default)]
pub struct PiperSynthesizer {
    command: Option<String>,
}

impl PiperSynthesizer {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("READER_PIPER_COMMAND")
                .map(|raw| raw.to_string_lossy().into_owned()),
        )
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    fn build_command(&self, request: &SynthesisRequest) -> Result<Command, SynthesisError> {
        if !request.model_path.exists() {
            return Err(SynthesisError::VoiceNotFound(request.model_path.clone()));
        }

        if let Some(parent) = request
            .output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|err| {
                SynthesisError::Other(format!(
                    "Unable to create output directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        if let Some(raw_command) = &self.command {
            let mut parts: Vec<String> = Shlex::new(raw_command).collect();
            if parts.is_empty() {
                return Err(SynthesisError::Other(
                    "READER_PIPER_COMMAND is empty".to_string(),
                ));
            }
            let program = parts.remove(0);
            let mut command = Command::new(program);
            command.args(parts);
            return Ok(command);
        }

        let bundled = runtime_dir()
            .join("piper")
            .join(if cfg!(windows) { "piper.exe" } else { "piper" });
        if bundled.exists() {
            return Ok(Command::new(bundled));
        }
        if let Ok(installed) = which::which("piper") {
            return Ok(Command::new(installed));
        }
        let mut command = Command::new("python");
        command.args(["-m", "piper"]);
        Ok(command)
    }

    fn command_arguments(command: &mut Command, request: &SynthesisRequest) {
        command.arg("--model");
        command.arg(&request.model_path);
        command.arg("--output_file");
        command.arg(&request.output_path);
        if let Some(scale) = request.length_scale {
            command.arg("--length_scale");
            command.arg(scale.to_string());
        }
    }
}

impl Synthesizer for PiperSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), SynthesisError> {
        let start = Instant::now();
        let mut command = self.build_command(request)?;
        Self::command_arguments(&mut command, request);
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| SynthesisError::Other("Failed to access Piper stdin".into()))?;
            // a command that exits without reading its input is judged by its status
            if let Err(err) = stdin.write_all(request.text.as_bytes()) {
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(SynthesisError::Other(err.to_string()));
                }
            }
        }
        let output = child
            .wait_with_output()
            .map_err(|err| SynthesisError::Other(err.to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let status = output.status.code().unwrap_or_default();
            error!("Piper command exited with status {status}: {stderr}");
            return Err(SynthesisError::PiperFailure { status, stderr });
        }
        if !request.output_path.exists() {
            warn!(
                "Piper succeeded but the expected output {:?} was not created",
                request.output_path
            );
        }

        debug!(
            "Synthesized {} chars in {} ms",
            request.text.len(),
            start.elapsed().as_millis()
        );
        Ok(())
    }
}
