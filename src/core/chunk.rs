//! Chunk representation for pdf-chat.
//!
//! A chunk is a contiguous page range of a document, serialized on its own
//! as a standalone PDF. Chunks are what gets sent to the remote API.

use regex::Regex;
use serde::Serialize;
use std::ops::Range;

/// Matches the trailing `(Chunk N)` of a selection label.
const LABEL_PATTERN: &str = r"\(Chunk (\d+)\)\s*$";

/// A contiguous page range of a document with its serialized bytes.
///
/// # Examples
///
/// ```
/// use pdf_chat::core::Chunk;
///
/// let chunk = Chunk::new(1, 100, 200, Vec::new());
/// assert_eq!(chunk.page_count(), 100);
/// assert_eq!(chunk.label(), "Pages 101-200 (Chunk 2)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Sequential index within the document (0-based).
    pub index: usize,

    /// First page of the chunk (0-based, inclusive).
    pub start_page: usize,

    /// End page of the chunk (0-based, exclusive).
    pub end_page: usize,

    /// The chunk serialized as a standalone PDF.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Chunk {
    /// Creates a new chunk.
    ///
    /// # Arguments
    ///
    /// * `index` - Sequential index within the document.
    /// * `start_page` - First page (inclusive).
    /// * `end_page` - Last page (exclusive).
    /// * `bytes` - Serialized PDF bytes for the page range.
    #[must_use]
    pub const fn new(index: usize, start_page: usize, end_page: usize, bytes: Vec<u8>) -> Self {
        Self {
            index,
            start_page,
            end_page,
            bytes,
        }
    }

    /// Returns the number of pages in the chunk.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.end_page - self.start_page
    }

    /// Returns the page range as a `Range`.
    #[must_use]
    pub const fn pages(&self) -> Range<usize> {
        self.start_page..self.end_page
    }

    /// Returns the serialized size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the human-readable selection label.
    ///
    /// The format is `Pages {start+1}-{end} (Chunk {index+1})` and is parsed
    /// back by [`parse_chunk_label`].
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "Pages {}-{} (Chunk {})",
            self.start_page + 1,
            self.end_page,
            self.index + 1
        )
    }
}

/// Maps a chunk selection back to a zero-based chunk index.
///
/// Accepts either a full label as produced by [`Chunk::label`] or a bare
/// 1-based chunk number. Returns `None` for anything else, including `0`.
///
/// # Examples
///
/// ```
/// use pdf_chat::core::parse_chunk_label;
///
/// assert_eq!(parse_chunk_label("Pages 101-200 (Chunk 2)"), Some(1));
/// assert_eq!(parse_chunk_label("3"), Some(2));
/// assert_eq!(parse_chunk_label("chunk two"), None);
/// ```
#[must_use]
pub fn parse_chunk_label(label: &str) -> Option<usize> {
    let trimmed = label.trim();
    let number = if let Ok(n) = trimmed.parse::<usize>() {
        n
    } else {
        let re = Regex::new(LABEL_PATTERN).ok()?;
        re.captures(trimmed)?.get(1)?.as_str().parse::<usize>().ok()?
    };
    number.checked_sub(1)
}
