use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence-terminal punctuation followed by a whitespace run, or a newline.
static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+|\n").expect("valid line boundary pattern"));

/// Split a page into narration lines.
///
/// A line ends right after `.`, `!` or `?` when whitespace follows (the
/// whitespace is dropped), and at every newline. Fragments that are empty or
/// whitespace-only are discarded; the others keep their original text and
/// order, so the same page always yields the same lines.
pub fn segment(page: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;

    for mat in BOUNDARY.find_iter(page) {
        let end = if page.as_bytes()[mat.start()] == b'\n' {
            mat.start()
        } else {
            // keep the punctuation mark, which is always one byte
            mat.start() + 1
        };
        push_line(&mut lines, &page[start..end]);
        start = mat.end();
    }
    push_line(&mut lines, &page[start..]);

    lines
}

fn push_line(lines: &mut Vec<String>, fragment: &str) {
    if !fragment.trim().is_empty() {
        lines.push(fragment.to_string());
    }
}
