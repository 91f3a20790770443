//! Reads paginated documents aloud one line at a time while keeping what the
//! user is looking at separate from where narration is.

pub mod document;
pub mod engine;
pub mod import;
pub mod narration;
pub mod session;
pub mod state;
pub mod text;
pub mod util;

pub use document::{Document, DocumentInfo};
pub use engine::{Cursor, Direction, PrimaryAction, Reader, ResumeState, SecondaryAction};
pub use narration::{NarrationConfig, NarrationEvent, Narrator, PiperNarrator};
pub use session::{Command, Session, SessionEvent};
