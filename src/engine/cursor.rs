/// The two positions the engine keeps apart: what is on screen and what is
/// being (or was last) narrated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub view_page: usize,
    /// Line explicitly marked by the user on the viewed page.
    pub view_selected_line: Option<usize>,
    pub read_page: usize,
    pub read_line: usize,
    pub is_playing: bool,
}

impl Cursor {
    pub fn is_user_away(&self) -> bool {
        self.view_page != self.read_page
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn away_only_when_pages_differ() {
        let mut cursor = Cursor::default();
        assert!(!cursor.is_user_away());
        cursor.read_line = 4;
        assert!(!cursor.is_user_away());
        cursor.view_page = 2;
        assert!(cursor.is_user_away());
        cursor.reset();
        assert_eq!(cursor, Cursor::default());
    }
}
