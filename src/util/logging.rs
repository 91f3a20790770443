use std::{fs, path::Path};

use anyhow::Context;
use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};

/// Start file logging under `log_dir` (`reader.log`, rotated at 5 MB).
///
/// Level comes from `RUST_LOG`, defaulting to `info`. The returned handle must
/// stay alive for as long as the process logs.
pub fn init(log_dir: &Path) -> anyhow::Result<LoggerHandle> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let handle = Logger::try_with_env_or_str("info")?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename("reader")
                .suffix("log")
                .suppress_timestamp(),
        )
        .rotate(
            Criterion::Size(5_000_000),
            Naming::Numbers,
            Cleanup::KeepLogFiles(5),
        )
        .write_mode(WriteMode::Direct)
        .duplicate_to_stderr(Duplicate::Warn)
        .start()
        .context("failed to initialise logger")?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let handle = init(&log_dir).unwrap();
        log::info!("logger ready");
        handle.flush();
        assert!(log_dir.exists());
    }
}
