//! Reading/playback synchronization engine.
//!
//! [`Reader`] owns the loaded [`Document`], the single authoritative
//! [`Cursor`] and the injected [`Narrator`]. Its operations are split by
//! concern:
//!
//! * [`scheduler`]: `start`/`stop`/`advance` and the narration callbacks,
//! * [`navigation`]: line skip, page skip, page jump and line selection,
//! * [`resume`]: the derived [`ResumeState`] and the actions it offers.
//!
//! Every method takes `&mut self`; callers serialize user actions and
//! narration events onto one thread, so no locking is involved.

pub mod cursor;
pub mod navigation;
pub mod resume;
pub mod scheduler;

use log::info;

use crate::document::Document;
use crate::narration::{NarrationConfig, Narrator};

pub use cursor::Cursor;
pub use navigation::Direction;
pub use resume::{PrimaryAction, ResumeState, SecondaryAction};

/// The unit currently handed to the narrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    seq: u64,
    page: usize,
    line: usize,
}

pub struct Reader<N> {
    narrator: N,
    config: NarrationConfig,
    document: Option<Document>,
    cursor: Cursor,
    next_seq: u64,
    in_flight: Option<InFlight>,
}

impl<N: Narrator> Reader<N> {
    pub fn new(narrator: N, config: NarrationConfig) -> Self {
        Self {
            narrator,
            config,
            document: None,
            cursor: Cursor::default(),
            next_seq: 1,
            in_flight: None,
        }
    }

    /// Replace the current document and rewind both cursors.
    ///
    /// A document without pages puts the engine in the "no document" state.
    pub fn load(&mut self, document: Document) {
        self.stop();
        info!(
            "Loaded document {:?} with {} pages",
            document.info().title.as_deref().unwrap_or("untitled"),
            document.page_count()
        );
        self.document = (document.page_count() > 0).then_some(document);
        self.cursor.reset();
    }

    pub fn reset(&mut self) {
        self.stop();
        self.document = None;
        self.cursor.reset();
        info!("Reader reset");
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.cursor.is_playing
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    /// Sequence number of the utterance the engine is waiting on, if any.
    pub fn pending_seq(&self) -> Option<u64> {
        self.in_flight.map(|unit| unit.seq)
    }

    /// Move the read cursor. The view follows only when the user was looking
    /// at the reading page, so someone browsing elsewhere is never yanked back.
    fn move_read_cursor(&mut self, page: usize, line: usize) {
        if page != self.cursor.read_page && !self.cursor.is_user_away() {
            self.cursor.view_page = page;
            self.cursor.view_selected_line = None;
        }
        self.cursor.read_page = page;
        self.cursor.read_line = line;
    }

    fn cancel_in_flight(&mut self) {
        self.narrator.cancel_all();
        self.in_flight = None;
    }
}

#[cfg(test)]
pub(crate) mod support {
    use super::*;
    use crate::narration::scripted::ScriptedNarrator;
    use crate::narration::NarrationEvent;

    pub fn reader(pages: &[&str]) -> Reader<ScriptedNarrator> {
        let mut reader = Reader::new(ScriptedNarrator::default(), NarrationConfig::default());
        reader.load(Document::new(
            pages.iter().map(|page| page.to_string()).collect(),
        ));
        reader
    }

    /// Fire `Started` and `Ended` for the pending utterance; returns its text.
    pub fn speak_pending(reader: &mut Reader<ScriptedNarrator>) -> Option<String> {
        let seq = reader.pending_seq()?;
        let text = reader
            .narrator()
            .submitted
            .iter()
            .find(|utterance| utterance.seq == seq)
            .map(|utterance| utterance.text.clone())?;
        reader.on_narration(NarrationEvent::Started(seq));
        reader.on_narration(NarrationEvent::Ended(seq));
        Some(text)
    }

    pub fn run_to_end(reader: &mut Reader<ScriptedNarrator>) -> Vec<String> {
        let mut spoken = Vec::new();
        while let Some(text) = speak_pending(reader) {
            spoken.push(text);
            assert!(spoken.len() < 1_000, "narration never finished");
        }
        spoken
    }

    /// Every reachable state keeps the read cursor on an existing line.
    pub fn assert_cursor_valid(reader: &Reader<ScriptedNarrator>) {
        let Some(document) = reader.document() else {
            return;
        };
        let cursor = reader.cursor();
        assert!(cursor.view_page < document.page_count());
        assert!(cursor.read_page < document.page_count());
        let lines = document.line_count(cursor.read_page);
        if lines > 0 {
            assert!(cursor.read_line < lines, "{cursor:?} past {lines} lines");
        }
    }
}
