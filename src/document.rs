use serde::{Deserialize, Serialize};

use crate::text::segment;

/// Optional metadata reported by the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// An immutable, paginated document.
///
/// Lines are segmented once per page when the document is built; since pages
/// never change afterwards the memoized lines cannot drift from the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pages: Vec<String>,
    lines: Vec<Vec<String>>,
    info: DocumentInfo,
}

impl Document {
    pub fn new(pages: Vec<String>) -> Self {
        let lines = pages.iter().map(|page| segment(page)).collect();
        Self {
            pages,
            lines,
            info: DocumentInfo::default(),
        }
    }

    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }

    /// Lines of `page`; empty for blank or out-of-range pages.
    pub fn lines(&self, page: usize) -> &[String] {
        self.lines.get(page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn line_count(&self, page: usize) -> usize {
        self.lines(page).len()
    }

    pub fn line(&self, page: usize, line: usize) -> Option<&str> {
        self.lines(page).get(line).map(String::as_str)
    }

    /// First page after `page` that has at least one line.
    pub fn next_narratable_page(&self, page: usize) -> Option<usize> {
        (page + 1..self.page_count()).find(|&candidate| self.line_count(candidate) > 0)
    }

    /// Resolve `(page, line)` to the position that would actually be spoken:
    /// the position itself when it exists, otherwise the first line of the
    /// next non-empty page. `None` means the document is exhausted.
    pub fn resolve_forward(&self, page: usize, line: usize) -> Option<(usize, usize)> {
        if line < self.line_count(page) {
            return Some((page, line));
        }
        self.next_narratable_page(page).map(|next| (next, 0))
    }

    /// The last line of the last page that has any lines.
    pub fn last_position(&self) -> Option<(usize, usize)> {
        self.lines
            .iter()
            .enumerate()
            .rev()
            .find(|(_, lines)| !lines.is_empty())
            .map(|(page, lines)| (page, lines.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(pages: &[&str]) -> Document {
        Document::new(pages.iter().map(|page| page.to_string()).collect())
    }

    #[test]
    fn memoizes_lines_per_page() {
        let doc = document(&["Um. Dois.", "", "Três"]);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.lines(0), ["Um.", "Dois."]);
        assert!(doc.lines(1).is_empty());
        assert_eq!(doc.line(2, 0), Some("Três"));
        assert_eq!(doc.line(2, 1), None);
        assert!(doc.lines(9).is_empty());
    }

    #[test]
    fn resolve_forward_skips_blank_pages() {
        let doc = document(&["", "Hello. World.", "", " \n "]);
        assert_eq!(doc.resolve_forward(0, 0), Some((1, 0)));
        assert_eq!(doc.resolve_forward(1, 1), Some((1, 1)));
        assert_eq!(doc.resolve_forward(1, 2), None);
        assert_eq!(doc.resolve_forward(7, 0), None);
    }

    #[test]
    fn last_position_ignores_trailing_blank_pages() {
        let doc = document(&["A. B.", "C.", ""]);
        assert_eq!(doc.last_position(), Some((1, 0)));
        assert_eq!(document(&["", ""]).last_position(), None);
    }
}
