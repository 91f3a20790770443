use std::path::PathBuf;

/// Directory holding bundled tools and generated audio.
///
/// `READER_RUNTIME_DIR` when set and non-empty, `runtime` otherwise.
pub fn runtime_dir() -> PathBuf {
    env_path("READER_RUNTIME_DIR").unwrap_or_else(|| PathBuf::from("runtime"))
}

/// A path taken from the environment, ignoring empty values.
pub fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
