//! Contract text loading.
//!
//! Contracts arrive as extracted plain text, pages separated by form feeds
//! (the layout `pdftotext` produces). Downstream consumers only ever see a
//! bounded excerpt.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DocumentError;

/// Page separator in extracted text.
pub const PAGE_BREAK: char = '\u{000C}';

/// A loaded contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDocument {
    source: Option<PathBuf>,
    pages: Vec<String>,
}

impl ContractDocument {
    /// Read a contract from a UTF-8 text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document = Self::from_text(&text)?;
        document.source = Some(path.to_path_buf());
        debug!(path = %path.display(), pages = document.pages.len(), "Contract loaded");
        Ok(document)
    }

    /// Build a document from already extracted text.
    pub fn from_text(text: &str) -> Result<Self, DocumentError> {
        if text.trim().is_empty() {
            return Err(DocumentError::Empty);
        }
        let pages = text.split(PAGE_BREAK).map(str::to_string).collect();
        Ok(Self {
            source: None,
            pages,
        })
    }

    /// File the document was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Pages in order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Full text, pages joined by newlines.
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }

    /// The first `max_pages` pages, cut to at most `max_chars` characters.
    pub fn excerpt(&self, max_pages: usize, max_chars: usize) -> String {
        let joined = self
            .pages
            .iter()
            .take(max_pages)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        truncate_chars(&joined, max_chars).to_string()
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
