use std::{fs, path::Path};

use super::{DocumentExtractor, Extraction, ImportError, PageText};
use crate::document::DocumentInfo;

const PAGE_BREAK: char = '\u{0c}';

/// Loads `.txt` files locally; form feeds separate pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn handles(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text"))
    }
}

pub fn paginate(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK).map(str::to_string).collect()
}

impl DocumentExtractor for TextExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ImportError> {
        let text = fs::read_to_string(path)?;
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Ok(Extraction {
            pages: Some(paginate(&text).into_iter().map(PageText::Plain).collect()),
            text: None,
            info: Some(DocumentInfo {
                title,
                author: None,
            }),
        })
    }
}
