use log::debug;

use super::{Cursor, Reader};
use crate::document::Document;
use crate::narration::Narrator;

/// What the main playback control does right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Play,
    Pause,
    /// Jump the view back to the reading page and continue from there.
    ResumeFromSaved,
    RestartFromBeginning,
}

impl PrimaryAction {
    pub fn label(self) -> &'static str {
        match self {
            PrimaryAction::Play => "Play",
            PrimaryAction::Pause => "Pause",
            PrimaryAction::ResumeFromSaved => "Resume from saved position",
            PrimaryAction::RestartFromBeginning => "Restart from the beginning",
        }
    }
}

/// Extra control offered while the user browses away from a paused reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryAction {
    ReadThisPage,
}

impl SecondaryAction {
    pub fn label(self) -> &'static str {
        match self {
            SecondaryAction::ReadThisPage => "Read this page now",
        }
    }
}

/// Controls derived from the cursor; recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeState {
    pub is_user_away: bool,
    pub is_end_of_book: bool,
    pub primary: PrimaryAction,
    pub secondary: Option<SecondaryAction>,
}

impl ResumeState {
    pub fn derive(document: &Document, cursor: &Cursor) -> Self {
        let is_user_away = cursor.is_user_away();
        let last = document.last_position();
        let is_end_of_book = last == Some((cursor.read_page, cursor.read_line));
        let viewing_last_page = last.is_some_and(|(page, _)| cursor.view_page == page);

        let primary = if is_end_of_book && viewing_last_page {
            PrimaryAction::RestartFromBeginning
        } else if is_user_away {
            PrimaryAction::ResumeFromSaved
        } else if cursor.is_playing {
            PrimaryAction::Pause
        } else {
            PrimaryAction::Play
        };
        let secondary = (is_user_away
            && !cursor.is_playing
            && primary != PrimaryAction::RestartFromBeginning)
            .then_some(SecondaryAction::ReadThisPage);

        Self {
            is_user_away,
            is_end_of_book,
            primary,
            secondary,
        }
    }
}

impl<N: Narrator> Reader<N> {
    /// `None` while no document is loaded.
    pub fn resume_state(&self) -> Option<ResumeState> {
        self.document
            .as_ref()
            .map(|document| ResumeState::derive(document, &self.cursor))
    }

    pub fn press_primary(&mut self) {
        let Some(state) = self.resume_state() else {
            return;
        };
        debug!("Primary action: {:?}", state.primary);
        match state.primary {
            PrimaryAction::Play | PrimaryAction::Pause => self.toggle_playback(),
            PrimaryAction::ResumeFromSaved => self.resume_from_saved(),
            PrimaryAction::RestartFromBeginning => self.restart_from_beginning(),
        }
    }

    /// Returns `false` when no secondary action is on offer.
    pub fn press_secondary(&mut self) -> bool {
        match self.resume_state().and_then(|state| state.secondary) {
            Some(SecondaryAction::ReadThisPage) => {
                self.read_this_page();
                true
            }
            None => false,
        }
    }

    pub fn toggle_playback(&mut self) {
        if self.cursor.is_playing {
            self.stop();
        } else {
            self.play();
        }
    }

    /// Bring the view back to the reading page and keep reading from the
    /// saved position. Narration already running is left alone.
    pub fn resume_from_saved(&mut self) {
        if self.document.is_none() {
            return;
        }
        if self.cursor.view_page != self.cursor.read_page {
            self.cursor.view_page = self.cursor.read_page;
            self.cursor.view_selected_line = None;
        }
        if !self.cursor.is_playing {
            self.play();
        }
    }

    pub fn restart_from_beginning(&mut self) {
        self.stop();
        self.cursor.reset();
    }

    /// Start narrating the viewed page from its first line.
    pub fn read_this_page(&mut self) {
        if self.document.is_none() {
            return;
        }
        let page = self.cursor.view_page;
        self.cursor.read_page = page;
        self.cursor.read_line = 0;
        self.start(page, 0);
    }
}
