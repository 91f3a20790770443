use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("no voice available for locale '{0}'")]
    NoVoiceForLocale(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceInfo {
    pub id: String,
    pub label: String,
    pub language: Option<String>,
    pub quality: Option<String>,
    pub model_path: PathBuf,
}

impl VoiceInfo {
    /// `pt-BR` matches the language code `pt_BR` (any case) or, lacking
    /// metadata, a model named like `pt_BR-faber-medium`.
    fn speaks(&self, locale: &str) -> bool {
        let wanted = normalize_locale(locale);
        match &self.language {
            Some(code) => normalize_locale(code) == wanted,
            None => normalize_locale(&self.id).starts_with(&wanted),
        }
    }
}

fn normalize_locale(value: &str) -> String {
    value.replace('-', "_").to_ascii_lowercase()
}

/// Piper voices (`*.onnx` plus optional `*.onnx.json`) found under a directory.
#[derive(Default)]
pub struct VoiceLibrary {
    base_dir: PathBuf,
    voices: RwLock<HashMap<String, VoiceInfo>>,
}

impl VoiceLibrary {
    pub fn new(base_dir: PathBuf) -> Self {
        let library = Self {
            base_dir,
            voices: RwLock::new(HashMap::new()),
        };
        library.refresh();
        library
    }

    pub fn refresh(&self) {
        let mut discovered = HashMap::new();
        if self.base_dir.exists() {
            for entry in WalkDir::new(&self.base_dir)
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("onnx") {
                    continue;
                }
                if let Some(info) = build_voice_info(path) {
                    discovered.insert(info.id.clone(), info);
                }
            }
        }
        log::info!(
            "Found {} voices in {}",
            discovered.len(),
            self.base_dir.display()
        );
        *self.voices.write() = discovered;
    }

    pub fn list(&self) -> Vec<VoiceInfo> {
        let mut voices: Vec<_> = self.voices.read().values().cloned().collect();
        voices.sort_by(|a, b| a.id.cmp(&b.id));
        voices
    }

    /// First voice (by id) speaking `locale`.
    pub fn find_for_locale(&self, locale: &str) -> Result<VoiceInfo, VoiceError> {
        self.list()
            .into_iter()
            .find(|voice| voice.speaks(locale))
            .ok_or_else(|| VoiceError::NoVoiceForLocale(locale.to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn build_voice_info(path: &Path) -> Option<VoiceInfo> {
    let id = path.file_stem()?.to_string_lossy().to_string();
    let metadata = metadata_path_for(path).and_then(|path| match fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str::<Value>(&contents)
            .map_err(|err| {
                log::warn!("Failed to parse metadata {}: {err}", path.display());
                err
            })
            .ok(),
        Err(err) => {
            log::warn!("Failed to read metadata {}: {err}", path.display());
            None
        }
    });
    let language = metadata.as_ref().and_then(|value| value.get("language"));

    let label = language
        .and_then(|lang| lang.get("name_native").or_else(|| lang.get("name")))
        .and_then(Value::as_str)
        .map(|lang| format!("{lang} · {id}"))
        .unwrap_or_else(|| id.clone());

    let quality = metadata
        .as_ref()
        .and_then(|value| value.get("audio"))
        .and_then(|audio| audio.get("quality"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(VoiceInfo {
        label,
        language: language
            .and_then(|lang| lang.get("code"))
            .and_then(Value::as_str)
            .map(str::to_string),
        quality,
        model_path: path.to_path_buf(),
        id,
    })
}

fn metadata_path_for(path: &Path) -> Option<PathBuf> {
    let mut metadata_path = path.to_path_buf();
    metadata_path.set_extension("onnx.json");
    metadata_path.exists().then_some(metadata_path)
}
