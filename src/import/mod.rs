//! Turning an uploaded file into a [`Document`].
//!
//! PDFs and other binary formats go to an extraction backend: the HTTP
//! service when an API URL is configured, the bundled Python script
//! otherwise. Plain text files are paginated locally.

pub mod http;
pub mod script;
pub mod text;

use std::{fs, path::Path, path::PathBuf};

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::document::{Document, DocumentInfo};

pub use http::HttpExtractor;
pub use script::ScriptExtractor;
pub use text::TextExtractor;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("file is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("unable to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("extraction service unreachable: {0}")]
    Network(String),
    #[error("extraction service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("extraction failed ({code}): {message}")]
    Script { code: String, message: String },
    #[error("malformed extraction result: {0}")]
    Parse(String),
}

/// A page as reported by a backend: bare text or `{ "text": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PageText {
    Plain(String),
    Object {
        #[serde(default)]
        text: String,
    },
}

impl PageText {
    pub fn into_text(self) -> String {
        match self {
            PageText::Plain(text) | PageText::Object { text } => text,
        }
    }
}

/// Raw extraction result, before it becomes a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub pages: Option<Vec<PageText>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "meta")]
    pub info: Option<DocumentInfo>,
}

impl Extraction {
    /// `pages` wins when non-empty; otherwise the whole `text` is one page.
    pub fn into_document(self) -> Document {
        let pages: Vec<String> = self
            .pages
            .unwrap_or_default()
            .into_iter()
            .map(PageText::into_text)
            .collect();
        let pages = if pages.is_empty() {
            vec![self.text.unwrap_or_default()]
        } else {
            pages
        };
        Document::new(pages).with_info(self.info.unwrap_or_default())
    }
}

pub trait DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ImportError>;
}

/// Front door for uploads: enforces the size limit and routes by extension.
pub struct Importer {
    remote: Box<dyn DocumentExtractor>,
    text: TextExtractor,
    limit: u64,
}

impl Importer {
    pub fn new(remote: Box<dyn DocumentExtractor>) -> Self {
        Self {
            remote,
            text: TextExtractor,
            limit: MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }
}

impl DocumentExtractor for Importer {
    fn extract(&self, path: &Path) -> Result<Extraction, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.to_path_buf()));
        }
        let size = fs::metadata(path)?.len();
        if size > self.limit {
            return Err(ImportError::TooLarge {
                size,
                limit: self.limit,
            });
        }

        info!("Importing {} ({size} bytes)", path.display());
        if TextExtractor::handles(path) {
            self.text.extract(path)
        } else {
            self.remote.extract(path)
        }
    }
}
