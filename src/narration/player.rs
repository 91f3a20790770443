use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unable to open audio file: {0}")]
    Io(String),
    #[error("audio file is corrupt: {0}")]
    Decode(String),
    #[error("no audio output device available")]
    Device,
}

/// Open and decode a WAV file without touching the output device.
pub fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, AudioError> {
    let file = File::open(path).map_err(|err| AudioError::Io(err.to_string()))?;
    Decoder::new(BufReader::new(file)).map_err(|err| AudioError::Decode(err.to_string()))
}

/// Plays one clip at a time on the default output device.
///
/// The output stream is not `Send`, so a `Player` lives on the thread that
/// opened it.
pub struct Player {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl Player {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default().map_err(|_| AudioError::Device)?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
        })
    }

    /// Replace whatever is playing with `path`.
    pub fn play(&mut self, path: &Path) -> Result<(), AudioError> {
        let source = open_source(path)?;
        self.stop();
        let sink = Sink::try_new(&self.handle).map_err(|err| AudioError::Io(err.to_string()))?;
        sink.append(source);
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn returns_error_for_missing_file() {
        let result = open_source(Path::new("/no/such/clip.wav"));
        assert!(matches!(result, Err(AudioError::Io(_))));
    }

    #[test]
    fn fails_for_invalid_wav() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "not a wav").unwrap();
        let result = open_source(tmp.path());
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }
}
