use std::str::FromStr;

use log::debug;

use super::Reader;
use crate::narration::Narrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "next" | "+" => Ok(Direction::Next),
            "prev" | "previous" | "-" => Ok(Direction::Previous),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

impl<N: Narrator> Reader<N> {
    /// Move the read cursor one line. Forward past the end of the page rolls
    /// onto the next page with text; the first and last lines of the
    /// document are hard stops.
    pub fn skip_line(&mut self, direction: Direction) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let (page, line) = (self.cursor.read_page, self.cursor.read_line);
        let target = match direction {
            Direction::Next if line + 1 < document.line_count(page) => Some((page, line + 1)),
            Direction::Next => document.next_narratable_page(page).map(|next| (next, 0)),
            Direction::Previous => line.checked_sub(1).map(|previous| (page, previous)),
        };
        let Some((page, line)) = target else {
            debug!("Line skip {direction:?} ignored at page {page} line {line}");
            return;
        };

        let was_playing = self.cursor.is_playing;
        self.cancel_in_flight();
        self.move_read_cursor(page, line);
        if was_playing {
            self.start(page, line);
        }
    }

    /// Browse one page without touching narration.
    pub fn skip_page(&mut self, direction: Direction) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let current = self.cursor.view_page;
        let target = match direction {
            Direction::Next => (current + 1 < document.page_count()).then_some(current + 1),
            Direction::Previous => current.checked_sub(1),
        };
        if let Some(page) = target {
            self.show_page(page);
        }
    }

    /// Show a page given its 1-based number as typed by the user.
    ///
    /// Returns `false`, leaving everything unchanged, for input that is not a
    /// page of the current document.
    pub fn jump_to_page(&mut self, input: &str) -> bool {
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        match input.trim().parse::<usize>() {
            Ok(number) if (1..=document.page_count()).contains(&number) => {
                self.show_page(number - 1);
                true
            }
            _ => {
                debug!("Ignoring page jump to {input:?}");
                false
            }
        }
    }

    /// Pick a line on the viewed page as the next narration start.
    ///
    /// Narration stops and the read cursor is anchored to the selection; the
    /// next play action starts exactly there.
    pub fn select_line(&mut self, index: usize) -> bool {
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        let page = self.cursor.view_page;
        if index >= document.line_count(page) {
            debug!("Ignoring selection of line {index} on page {page}");
            return false;
        }

        self.stop();
        self.cursor.view_selected_line = Some(index);
        self.cursor.read_page = page;
        self.cursor.read_line = index;
        true
    }

    fn show_page(&mut self, page: usize) {
        if page != self.cursor.view_page {
            self.cursor.view_page = page;
            self.cursor.view_selected_line = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::support::*;

    #[test]
    fn parses_directions() {
        assert_eq!("next".parse::<Direction>(), Ok(Direction::Next));
        assert_eq!(" Prev ".parse::<Direction>(), Ok(Direction::Previous));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn skip_line_moves_within_page_while_paused() {
        let mut reader = reader(&["A. B. C."]);
        reader.skip_line(Direction::Next);
        reader.skip_line(Direction::Next);
        assert_eq!(reader.cursor().read_line, 2);
        assert!(reader.narrator().submitted.is_empty());

        reader.skip_line(Direction::Previous);
        assert_eq!(reader.cursor().read_line, 1);
    }

    #[test]
    fn skip_line_restarts_narration_when_playing() {
        let mut reader = reader(&["A. B. C."]);
        reader.start(0, 0);
        let first = reader.pending_seq().unwrap();

        reader.skip_line(Direction::Next);
        assert!(reader.is_playing());
        assert_eq!(reader.cursor().read_line, 1);
        assert_eq!(reader.narrator().spoken(), vec!["A.", "B."]);
        assert_ne!(reader.pending_seq(), Some(first));
    }

    #[test]
    fn skip_line_rolls_over_to_next_page_with_text() {
        let mut reader = reader(&["A. B.", "", "C."]);
        reader.skip_line(Direction::Next);
        reader.skip_line(Direction::Next);
        assert_eq!((reader.cursor().read_page, reader.cursor().read_line), (2, 0));
        assert_eq!(reader.cursor().view_page, 2);
        assert_cursor_valid(&reader);
    }

    #[test]
    fn skip_line_is_a_no_op_at_document_edges() {
        let mut reader = reader(&["A.", "B."]);
        reader.start(0, 0);
        let cancels = reader.narrator().cancels;

        reader.skip_line(Direction::Previous);
        assert_eq!(reader.narrator().cancels, cancels);
        assert!(reader.is_playing());

        reader.skip_line(Direction::Next);
        reader.skip_line(Direction::Next);
        assert_eq!((reader.cursor().read_page, reader.cursor().read_line), (1, 0));
        assert!(reader.is_playing());
        assert_cursor_valid(&reader);
    }

    #[test]
    fn skip_page_never_touches_read_cursor() {
        let mut reader = reader(&["A. B.", "C.", "D."]);
        reader.skip_line(Direction::Next);
        reader.skip_page(Direction::Next);
        reader.skip_page(Direction::Next);
        assert_eq!(reader.cursor().view_page, 2);

        reader.skip_page(Direction::Next);
        assert_eq!(reader.cursor().view_page, 2);
        assert_eq!((reader.cursor().read_page, reader.cursor().read_line), (0, 1));

        reader.skip_page(Direction::Previous);
        assert_eq!(reader.cursor().view_page, 1);
    }

    #[test]
    fn skip_page_keeps_narration_running() {
        let mut reader = reader(&["A. B.", "C."]);
        reader.start(0, 0);
        reader.skip_page(Direction::Next);
        assert!(reader.is_playing());
        assert!(reader.pending_seq().is_some());
    }

    #[test]
    fn jump_to_page_accepts_only_valid_page_numbers() {
        let mut reader = reader(&["A.", "B.", "C."]);
        assert!(reader.jump_to_page(" 3 "));
        assert_eq!(reader.cursor().view_page, 2);

        for input in ["0", "4", "-1", "two", "", "1.5"] {
            assert!(!reader.jump_to_page(input), "{input:?} accepted");
            assert_eq!(reader.cursor().view_page, 2);
        }
        assert_eq!(reader.cursor().read_page, 0);
    }

    #[test]
    fn select_line_anchors_read_cursor_and_play_resumes_there() {
        let mut reader = reader(&["A.", "B. C. D. E.", "F."]);
        reader.start(0, 0);
        reader.skip_page(Direction::Next);

        assert!(reader.select_line(2));
        assert_eq!(reader.cursor().read_page, 1);
        assert_eq!(reader.cursor().read_line, 2);
        assert_eq!(reader.cursor().view_selected_line, Some(2));
        assert!(!reader.is_playing());
        assert_eq!(reader.pending_seq(), None);

        reader.press_primary();
        assert!(reader.is_playing());
        assert_eq!(reader.narrator().spoken().last(), Some(&"D."));
    }

    #[test]
    fn select_line_out_of_range_is_ignored() {
        let mut reader = reader(&["A. B."]);
        reader.start(0, 0);
        assert!(!reader.select_line(5));
        assert!(reader.is_playing());
        assert_eq!(reader.cursor().view_selected_line, None);
    }

    #[test]
    fn page_change_clears_selection() {
        let mut reader = reader(&["A. B.", "C."]);
        reader.select_line(1);
        reader.skip_page(Direction::Next);
        assert_eq!(reader.cursor().view_selected_line, None);
    }
}
