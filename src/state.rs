use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;

use crate::{
    import::{DocumentExtractor, HttpExtractor, Importer, ScriptExtractor},
    narration::VoiceLibrary,
    util::runtime::{env_path, runtime_dir},
};

/// Process-wide settings resolved from the environment at start-up.
pub struct AppState {
    pub voices: VoiceLibrary,
    output_dir: PathBuf,
    pdf_script: PathBuf,
    python_bin: OsString,
}

impl AppState {
    pub fn initialise() -> Result<Self> {
        let voices_dir =
            env_path("READER_VOICES_DIR").unwrap_or_else(|| PathBuf::from("assets/voices"));
        let voices = VoiceLibrary::new(voices_dir);

        let output_dir =
            env_path("READER_OUTPUT_DIR").unwrap_or_else(|| runtime_dir().join("output"));
        fs::create_dir_all(&output_dir).with_context(|| {
            format!("unable to create output directory {}", output_dir.display())
        })?;

        let pdf_script = env_path("READER_PDF_SCRIPT")
            .unwrap_or_else(|| PathBuf::from("scripts/py/pdf_extract.py"));
        let python_bin = std::env::var_os("READER_PYTHON_BIN")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| OsString::from("python"));

        Ok(Self {
            voices,
            output_dir,
            pdf_script,
            python_bin,
        })
    }

    /// Upload pipeline: the HTTP service when `api_url` is given, the local
    /// extraction script otherwise.
    pub fn importer(&self, api_url: Option<&str>) -> Result<Importer> {
        let remote: Box<dyn DocumentExtractor> = match api_url {
            Some(url) => {
                let client = HttpExtractor::new(url)
                    .context("failed to build extraction service client")?;
                info!("Extracting documents through {}", client.endpoint());
                Box::new(client)
            }
            None => {
                info!("Extracting documents with {}", self.pdf_script.display());
                Box::new(ScriptExtractor::new(
                    self.python_bin.clone(),
                    self.pdf_script.clone(),
                ))
            }
        };
        Ok(Importer::new(remote))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    fn scoped_env(key: &'static str, value: &Path) -> EnvGuard {
        let previous = std::env::var_os(key);
        std::env::set_var(key, value);
        EnvGuard { key, previous }
    }

    #[test]
    #[serial]
    fn initialise_creates_output_directory() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("out");
        let _output = scoped_env("READER_OUTPUT_DIR", &output);
        let _voices = scoped_env("READER_VOICES_DIR", &temp.path().join("voices"));

        let state = AppState::initialise().unwrap();
        assert!(output.is_dir());
        assert_eq!(state.output_dir(), output.as_path());
        assert!(state.voices.list().is_empty());
    }

    #[test]
    #[serial]
    fn importer_builds_for_both_backends() {
        let temp = tempfile::tempdir().unwrap();
        let _output = scoped_env("READER_OUTPUT_DIR", &temp.path().join("out"));
        let state = AppState::initialise().unwrap();
        assert!(state.importer(None).is_ok());
        assert!(state.importer(Some("http://localhost:3000")).is_ok());
    }
}
