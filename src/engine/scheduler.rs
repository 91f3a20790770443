use log::{debug, info, warn};

use super::{InFlight, Reader};
use crate::narration::{NarrationEvent, Narrator, Utterance};

impl<N: Narrator> Reader<N> {
    /// Begin narrating at `(page, line)`.
    pub fn start(&mut self, page: usize, line: usize) {
        if self.document.is_none() {
            return;
        }
        self.cursor.is_playing = true;
        self.advance(page, line);
    }

    /// Continue from the read cursor.
    pub fn play(&mut self) {
        let (page, line) = (self.cursor.read_page, self.cursor.read_line);
        self.start(page, line);
    }

    pub fn stop(&mut self) {
        self.cursor.is_playing = false;
        self.cancel_in_flight();
    }

    /// Feed a narrator callback back into the engine.
    ///
    /// Only events for the unit currently in flight are honoured; anything
    /// tagged with an older sequence number belongs to a cancelled unit.
    pub fn on_narration(&mut self, event: NarrationEvent) {
        let Some(unit) = self.in_flight.filter(|unit| unit.seq == event.seq()) else {
            debug!("Ignoring stale narration event {event:?}");
            return;
        };

        match event {
            NarrationEvent::Started(_) => {
                self.cursor.read_page = unit.page;
                self.cursor.read_line = unit.line;
            }
            NarrationEvent::Ended(_) => {
                self.in_flight = None;
                if self.cursor.is_playing {
                    self.advance(unit.page, unit.line + 1);
                }
            }
            NarrationEvent::Failed { message, .. } => {
                warn!(
                    "Narration failed at page {} line {}: {message}",
                    unit.page, unit.line
                );
                self.in_flight = None;
                self.cursor.is_playing = false;
            }
        }
    }

    /// Submit the unit at `(page, line)`, rolling over to the next non-empty
    /// page when the line does not exist, or stop at the end of the document.
    fn advance(&mut self, page: usize, line: usize) {
        self.cancel_in_flight();

        let Some(document) = self.document.as_ref() else {
            self.cursor.is_playing = false;
            return;
        };
        let Some((target_page, target_line)) = document.resolve_forward(page, line) else {
            info!("Reached the end of the document");
            self.cursor.is_playing = false;
            return;
        };
        let text = document
            .line(target_page, target_line)
            .unwrap_or_default()
            .to_string();

        if target_page != page {
            debug!("Skipping from page {page} to page {target_page}");
            self.move_read_cursor(target_page, target_line);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let utterance = Utterance {
            seq,
            text,
            config: self.config.clone(),
        };
        match self.narrator.submit(utterance) {
            Ok(()) => {
                self.in_flight = Some(InFlight {
                    seq,
                    page: target_page,
                    line: target_line,
                });
            }
            Err(err) => {
                warn!("Narrator rejected page {target_page} line {target_line}: {err}");
                self.cursor.is_playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;
    use crate::engine::support::*;
    use crate::engine::Reader;
    use crate::narration::scripted::ScriptedNarrator;
    use crate::narration::{NarrationConfig, NarrationEvent};

    #[test]
    fn narrates_every_line_in_order() {
        let mut reader = reader(&["Um. Dois.", "Três!\nQuatro"]);
        reader.start(0, 0);
        let spoken = run_to_end(&mut reader);
        assert_eq!(spoken, vec!["Um.", "Dois.", "Três!", "Quatro"]);
        assert!(!reader.is_playing());
        assert_cursor_valid(&reader);
    }

    #[test]
    fn auto_skip_passes_blank_pages() {
        let mut reader = reader(&["", "Hello. World.", ""]);
        reader.start(0, 0);

        assert_eq!(reader.narrator().spoken(), vec!["Hello."]);
        assert_eq!(reader.cursor().read_page, 1);
        assert_eq!(reader.cursor().read_line, 0);
        // the user was following along, so the view moves too
        assert_eq!(reader.cursor().view_page, 1);

        let spoken = run_to_end(&mut reader);
        assert_eq!(spoken, vec!["Hello.", "World."]);
        assert_eq!((reader.cursor().read_page, reader.cursor().read_line), (1, 1));
        assert!(!reader.is_playing());
    }

    #[test]
    fn end_of_book_keeps_last_position() {
        let mut reader = reader(&["One."]);
        reader.start(0, 0);
        run_to_end(&mut reader);
        assert!(!reader.is_playing());
        assert_eq!(reader.cursor().read_page, 0);
        assert_eq!(reader.cursor().read_line, 0);
    }

    #[test]
    fn read_cursor_commits_on_started() {
        let mut reader = reader(&["Um. Dois. Três."]);
        reader.start(0, 0);
        let first = reader.pending_seq().unwrap();
        reader.on_narration(NarrationEvent::Started(first));
        reader.on_narration(NarrationEvent::Ended(first));

        // line 1 is submitted but has not started yet
        assert_eq!(reader.cursor().read_line, 0);
        let second = reader.pending_seq().unwrap();
        reader.on_narration(NarrationEvent::Started(second));
        assert_eq!(reader.cursor().read_line, 1);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut reader = reader(&["Um. Dois. Três."]);
        reader.start(0, 0);
        let stale = reader.pending_seq().unwrap();
        reader.start(0, 2);
        let current = reader.pending_seq().unwrap();
        assert!(current > stale);

        reader.on_narration(NarrationEvent::Started(stale));
        reader.on_narration(NarrationEvent::Ended(stale));
        assert_eq!(reader.pending_seq(), Some(current));
        assert_eq!(reader.narrator().submitted.len(), 2);
        assert_eq!(reader.cursor().read_line, 0);

        reader.on_narration(NarrationEvent::Started(current));
        assert_eq!(reader.cursor().read_line, 2);
    }

    #[test]
    fn every_submission_is_preceded_by_a_cancel() {
        let mut reader = reader(&["A. B.", "C."]);
        reader.start(0, 0);
        run_to_end(&mut reader);
        let narrator = reader.narrator();
        assert_eq!(narrator.submitted.len(), 3);
        // one cancel per submission plus the final end-of-document advance
        assert!(narrator.cancels >= narrator.submitted.len());
    }

    #[test]
    fn stop_cancels_and_suppresses_the_chain() {
        let mut reader = reader(&["A. B."]);
        reader.start(0, 0);
        let seq = reader.pending_seq().unwrap();
        reader.on_narration(NarrationEvent::Started(seq));
        reader.stop();

        reader.on_narration(NarrationEvent::Ended(seq));
        assert_eq!(reader.narrator().submitted.len(), 1);
        assert_eq!(reader.narrator().active(), None);
        assert!(!reader.is_playing());
    }

    #[test]
    fn view_stays_put_when_user_is_browsing() {
        let mut reader = reader(&["A.", "B.", "C."]);
        reader.start(0, 0);
        reader.skip_page(crate::engine::Direction::Next);
        reader.skip_page(crate::engine::Direction::Next);
        assert_eq!(reader.cursor().view_page, 2);

        speak_pending(&mut reader);
        assert_eq!(reader.cursor().read_page, 1);
        assert_eq!(reader.cursor().view_page, 2);
    }

    #[test]
    fn rejected_submission_stops_playback() {
        let mut reader = Reader::new(ScriptedNarrator::rejecting(), NarrationConfig::default());
        reader.load(Document::new(vec!["Um.".into()]));
        reader.start(0, 0);
        assert!(!reader.is_playing());
        assert_eq!(reader.pending_seq(), None);
    }

    #[test]
    fn failure_event_stops_playback() {
        let mut reader = reader(&["Um. Dois."]);
        reader.start(0, 0);
        let seq = reader.pending_seq().unwrap();
        reader.on_narration(NarrationEvent::Failed {
            seq,
            message: "no audio device".into(),
        });
        assert!(!reader.is_playing());
        assert_eq!(reader.pending_seq(), None);
        assert_eq!(reader.cursor().read_line, 0);
    }

    #[test]
    fn utterances_carry_the_configured_voice() {
        let mut reader = Reader::new(
            ScriptedNarrator::default(),
            NarrationConfig::new("en-US", 1.25),
        );
        reader.load(Document::new(vec!["Hi.".into()]));
        reader.play();
        let utterance = &reader.narrator().submitted[0];
        assert_eq!(utterance.config.locale, "en-US");
        assert_eq!(utterance.config.rate, 1.25);
        assert_eq!(utterance.text, "Hi.");
    }
}
