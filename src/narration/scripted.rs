use super::{NarrationError, Narrator, Utterance};

/// Test double that records submissions instead of speaking.
///
/// Events are fired by the test itself, synchronously, through
/// `Reader::on_narration`. Submitting while another utterance is still active
/// panics, which is how tests catch overlapping narration.
#[derive(Debug, Default)]
pub(crate) struct ScriptedNarrator {
    pub submitted: Vec<Utterance>,
    pub cancels: usize,
    pub reject: bool,
    /// Accept this many submissions, then reject the rest.
    pub accept_limit: Option<usize>,
    active: Option<u64>,
}

impl ScriptedNarrator {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn rejecting_after(accepted: usize) -> Self {
        Self {
            accept_limit: Some(accepted),
            ..Self::default()
        }
    }

    pub fn active(&self) -> Option<u64> {
        self.active
    }

    pub fn spoken(&self) -> Vec<&str> {
        self.submitted
            .iter()
            .map(|utterance| utterance.text.as_str())
            .collect()
    }
}

impl Narrator for ScriptedNarrator {
    fn submit(&mut self, utterance: Utterance) -> Result<(), NarrationError> {
        let exhausted = self
            .accept_limit
            .is_some_and(|limit| self.submitted.len() >= limit);
        if self.reject || exhausted {
            return Err(NarrationError::Rejected("scripted rejection".into()));
        }
        assert!(
            self.active.is_none(),
            "utterance {} submitted while {:?} is still active",
            utterance.seq,
            self.active
        );
        self.active = Some(utterance.seq);
        self.submitted.push(utterance);
        Ok(())
    }

    fn cancel_all(&mut self) {
        self.cancels += 1;
        self.active = None;
    }
}
