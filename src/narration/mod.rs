//! The narration capability consumed by the reading engine.
//!
//! A [`Narrator`] speaks one [`Utterance`] at a time and reports progress
//! asynchronously as [`NarrationEvent`]s tagged with the utterance's sequence
//! number. The engine never blocks on narration: it submits, and later feeds
//! the events it receives back into [`crate::engine::Reader::on_narration`].
//!
//! The production implementation is [`PiperNarrator`], which synthesizes with
//! Piper and plays the result through rodio on a worker thread.

pub mod piper;
pub mod player;
#[cfg(test)]
pub(crate) mod scripted;
pub mod voices;
pub mod worker;

use thiserror::Error;

pub use piper::{PiperSynthesizer, SynthesisError, SynthesisRequest, Synthesizer};
pub use voices::{VoiceInfo, VoiceLibrary};
pub use worker::PiperNarrator;

pub const DEFAULT_LOCALE: &str = "pt-BR";
pub const DEFAULT_RATE: f32 = 1.0;

/// Voice settings applied to every utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationConfig {
    pub locale: String,
    pub rate: f32,
}

impl NarrationConfig {
    pub fn new(locale: impl Into<String>, rate: f32) -> Self {
        Self {
            locale: locale.into(),
            rate,
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE, DEFAULT_RATE)
    }
}

/// One narration unit submitted to a [`Narrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub seq: u64,
    pub text: String,
    pub config: NarrationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEvent {
    Started(u64),
    Ended(u64),
    Failed { seq: u64, message: String },
}

impl NarrationEvent {
    pub fn seq(&self) -> u64 {
        match self {
            NarrationEvent::Started(seq) | NarrationEvent::Ended(seq) => *seq,
            NarrationEvent::Failed { seq, .. } => *seq,
        }
    }
}

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration is unavailable: {0}")]
    Unavailable(String),
    #[error("narration request rejected: {0}")]
    Rejected(String),
}

/// Sequential speech output.
///
/// Implementations emit `Started` then `Ended` for each submitted utterance,
/// or nothing at all once [`Narrator::cancel_all`] has been called for it.
pub trait Narrator {
    fn submit(&mut self, utterance: Utterance) -> Result<(), NarrationError>;

    /// Stop the current utterance and suppress callbacks of everything
    /// submitted so far. Must be cheap and safe to call when idle.
    fn cancel_all(&mut self);
}
