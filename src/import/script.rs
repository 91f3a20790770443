use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use log::{error, info};
use serde_json::Value;

use super::{DocumentExtractor, Extraction, ImportError};

/// Runs `{python} {script} {file}` and reads the JSON it prints:
/// `{"ok": true, "pages": [...], "meta": {...}}` or
/// `{"ok": false, "code": "...", "message": "..."}`.
pub struct ScriptExtractor {
    python: OsString,
    script: PathBuf,
}

impl ScriptExtractor {
    pub fn new(python: impl Into<OsString>, script: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
        }
    }
}

impl DocumentExtractor for ScriptExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ImportError> {
        let output = Command::new(&self.python)
            .arg(&self.script)
            .arg(path)
            .output()
            .map_err(|err| {
                error!("Unable to run {}: {err}", self.script.display());
                ImportError::Script {
                    code: "PDF_SCRIPT_FAIL".into(),
                    message: err.to_string(),
                }
            })?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Extraction script failed: {message}");
            return Err(ImportError::Script {
                code: "PDF_SCRIPT_FAIL".into(),
                message,
            });
        }

        parse_output(&output.stdout)
    }
}

fn parse_output(stdout: &[u8]) -> Result<Extraction, ImportError> {
    let json: Value =
        serde_json::from_slice(stdout).map_err(|err| ImportError::Parse(err.to_string()))?;

    if json.get("ok") != Some(&Value::Bool(true)) {
        let field = |key: &str, fallback: &str| {
            json.get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };
        return Err(ImportError::Script {
            code: field("code", "PDF_PARSE_FAIL"),
            message: field("message", "extraction failed"),
        });
    }

    let extraction: Extraction =
        serde_json::from_value(json).map_err(|err| ImportError::Parse(err.to_string()))?;
    info!(
        "Extracted {} pages",
        extraction.pages.as_ref().map(Vec::len).unwrap_or(0)
    );
    Ok(extraction)
}
