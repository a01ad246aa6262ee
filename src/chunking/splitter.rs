//! Greedy page-bounded PDF splitting.
//!
//! Pages are packed in order into the open chunk until adding the next page
//! would break the page limit or the size limit, at which point the open
//! chunk is written out and a new one starts at that page. A page that is
//! larger than the size limit on its own still becomes a chunk, so every
//! page is always covered exactly once.

use crate::chunking::sizing::Sizing;
use crate::chunking::subset::PageSource;
use crate::chunking::{DEFAULT_MAX_PAGES, DEFAULT_MAX_SIZE_BYTES};
use crate::core::{BYTES_PER_MB, Chunk, Document};
use crate::error::{ChunkingError, Result};
use std::ops::Range;
use tracing::{debug, info};

/// Size and page bounds for a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    /// Maximum serialized chunk size in bytes.
    pub max_size_bytes: usize,
    /// Maximum pages per chunk.
    pub max_pages: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl ChunkLimits {
    /// Creates limits from a byte size and a page count.
    #[must_use]
    pub const fn new(max_size_bytes: usize, max_pages: usize) -> Self {
        Self {
            max_size_bytes,
            max_pages,
        }
    }

    /// Creates limits from a size in megabytes and a page count.
    #[must_use]
    pub const fn from_megabytes(max_size_mb: usize, max_pages: usize) -> Self {
        Self::new(max_size_mb.saturating_mul(BYTES_PER_MB), max_pages)
    }

    /// Checks that both limits are positive.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkingError::InvalidConfig`] if either limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "max_size_bytes must be > 0".to_string(),
            }
            .into());
        }
        if self.max_pages == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "max_pages must be > 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Checks whether a whole document already fits in one chunk.
    #[must_use]
    pub const fn fits(&self, size: usize, pages: usize) -> bool {
        size <= self.max_size_bytes && pages <= self.max_pages
    }
}

/// Splits PDFs into chunks that respect [`ChunkLimits`].
///
/// # Examples
///
/// ```no_run
/// use pdf_chat::chunking::{ChunkLimits, PdfChunker};
///
/// let bytes = std::fs::read("report.pdf").unwrap();
/// let chunker = PdfChunker::new(ChunkLimits::from_megabytes(32, 100));
/// for chunk in chunker.split(&bytes).unwrap() {
///     println!("{}", chunk.label());
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfChunker {
    limits: ChunkLimits,
    sizing: Sizing,
}

impl PdfChunker {
    /// Creates a chunker with the given limits and estimated sizing.
    #[must_use]
    pub const fn new(limits: ChunkLimits) -> Self {
        Self {
            limits,
            sizing: Sizing::Estimated,
        }
    }

    /// Sets the sizing strategy.
    #[must_use]
    pub const fn with_sizing(mut self, sizing: Sizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> ChunkLimits {
        self.limits
    }

    /// Returns the configured sizing strategy.
    #[must_use]
    pub const fn sizing(&self) -> Sizing {
        self.sizing
    }

    /// Parses `bytes` and splits them into chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are invalid or the bytes are not a
    /// readable PDF.
    pub fn split(&self, bytes: &[u8]) -> Result<Vec<Chunk>> {
        self.limits.validate()?;
        let document = Document::from_bytes(bytes.to_vec())?;
        self.split_document(&document)
    }

    /// Splits an already parsed document into chunks.
    ///
    /// A document within both limits comes back as a single chunk holding
    /// the original bytes unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are invalid or page serialization
    /// fails.
    pub fn split_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        self.limits.validate()?;

        let total_pages = document.page_count();
        info!(size_mb = document.size_mb(), total_pages, "splitting PDF");

        if self.limits.fits(document.size(), total_pages) {
            return Ok(vec![Chunk::new(
                0,
                0,
                total_pages,
                document.bytes().to_vec(),
            )]);
        }

        let source = PageSource::parse(document.bytes())?;
        let mut chunks = Vec::new();
        let mut open: Range<usize> = 0..0;
        let mut running = 0;

        for page in 0..source.page_count() {
            let page_size = source.serialize(page..page + 1)?.len();

            if open.is_empty() {
                open = page..page + 1;
                running = page_size;
                continue;
            }

            let projected =
                self.sizing
                    .projected_size(&source, &open, running, page, page_size)?;
            if open.len() >= self.limits.max_pages || projected > self.limits.max_size_bytes {
                chunks.push(close_chunk(&source, chunks.len(), open)?);
                open = page..page + 1;
                running = page_size;
            } else {
                open.end = page + 1;
                running = projected;
            }
        }

        if !open.is_empty() {
            chunks.push(close_chunk(&source, chunks.len(), open)?);
        }

        info!(chunks = chunks.len(), sizing = %self.sizing, "PDF split");
        Ok(chunks)
    }
}

fn close_chunk(source: &PageSource, index: usize, pages: Range<usize>) -> Result<Chunk> {
    let bytes = source.serialize(pages.clone())?;
    debug!(
        index,
        start_page = pages.start,
        end_page = pages.end,
        size = bytes.len(),
        "closed chunk"
    );
    Ok(Chunk::new(index, pages.start, pages.end, bytes))
}

/// Splits `bytes` into chunks of at most `max_size_bytes` and `max_pages`.
///
/// Convenience wrapper around [`PdfChunker`] with estimated sizing.
///
/// # Errors
///
/// Returns an error if a limit is zero or the bytes are not a readable PDF.
pub fn split(bytes: &[u8], max_size_bytes: usize, max_pages: usize) -> Result<Vec<Chunk>> {
    PdfChunker::new(ChunkLimits::new(max_size_bytes, max_pages)).split(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, Error};
    use crate::test_support::sample_pdf;

    fn boundaries(chunks: &[Chunk]) -> Vec<(usize, usize)> {
        chunks.iter().map(|c| (c.start_page, c.end_page)).collect()
    }

    #[test]
    fn test_limits_default() {
        let limits = ChunkLimits::default();
        assert_eq!(limits.max_size_bytes, 32 * 1024 * 1024);
        assert_eq!(limits.max_pages, 100);
        assert_eq!(ChunkLimits::from_megabytes(32, 100), limits);
    }

    #[test]
    fn test_limits_validate() {
        assert!(ChunkLimits::new(0, 10).validate().is_err());
        assert!(ChunkLimits::new(10, 0).validate().is_err());
        assert!(ChunkLimits::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_small_document_single_chunk() {
        let bytes = sample_pdf(3, 0);
        let chunks = PdfChunker::default().split(&bytes).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(boundaries(&chunks), vec![(0, 3)]);
        assert_eq!(chunks[0].bytes, bytes);
    }

    #[test]
    fn test_page_limit_boundaries() {
        let bytes = sample_pdf(7, 0);
        let chunks = split(&bytes, DEFAULT_MAX_SIZE_BYTES, 3).unwrap();
        assert_eq!(boundaries(&chunks), vec![(0, 3), (3, 6), (6, 7)]);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            let reparsed = lopdf::Document::load_mem(&chunk.bytes).unwrap();
            assert_eq!(reparsed.get_pages().len(), chunk.page_count());
        }
    }

    #[test]
    fn test_size_limit_boundaries() {
        // Each page serializes to a little over 4 KB: two fit in 10 KB, three do not.
        let bytes = sample_pdf(5, 4_000);
        let chunks = split(&bytes, 10_000, 100).unwrap();
        assert_eq!(boundaries(&chunks), vec![(0, 2), (2, 4), (4, 5)]);
        for chunk in &chunks {
            assert!(chunk.size() <= 10_000);
        }
    }

    #[test]
    fn test_oversized_page_gets_own_chunk() {
        let bytes = sample_pdf(3, 20_000);
        let chunks = split(&bytes, 10_000, 100).unwrap();

        assert_eq!(boundaries(&chunks), vec![(0, 1), (1, 2), (2, 3)]);
        for chunk in &chunks {
            assert!(chunk.size() > 10_000);
        }
    }

    #[test]
    fn test_exact_sizing_same_boundaries_for_uniform_pages() {
        let bytes = sample_pdf(5, 4_000);
        let chunker = PdfChunker::new(ChunkLimits::new(10_000, 100)).with_sizing(Sizing::Exact);
        let chunks = chunker.split(&bytes).unwrap();
        assert_eq!(boundaries(&chunks), vec![(0, 2), (2, 4), (4, 5)]);
    }

    #[test]
    fn test_exact_sizing_packs_tighter() {
        // Shared resources are counted once per page by the estimate only.
        let bytes = sample_pdf(12, 0);
        let single = PageSource::parse(&bytes)
            .unwrap()
            .serialize(0..1)
            .unwrap()
            .len();
        let limits = ChunkLimits::new(single * 3, 100);

        let estimated = PdfChunker::new(limits).split(&bytes).unwrap();
        let exact = PdfChunker::new(limits)
            .with_sizing(Sizing::Exact)
            .split(&bytes)
            .unwrap();

        assert!(exact.len() <= estimated.len());
        assert_eq!(estimated.last().map(|c| c.end_page), Some(12));
        assert_eq!(exact.last().map(|c| c.end_page), Some(12));
    }

    #[test]
    fn test_split_is_deterministic() {
        let bytes = sample_pdf(9, 1_000);
        let first = split(&bytes, 5_000, 4).unwrap();
        let second = split(&bytes, 5_000, 4).unwrap();
        assert_eq!(boundaries(&first), boundaries(&second));
    }

    #[test]
    fn test_invalid_document() {
        let result = split(b"not a pdf at all", 1_000, 10);
        assert!(matches!(
            result,
            Err(Error::Document(DocumentError::Parse(_)))
        ));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let bytes = sample_pdf(1, 0);
        assert!(matches!(
            split(&bytes, 0, 10),
            Err(Error::Chunking(ChunkingError::InvalidConfig { .. }))
        ));
        assert!(split(&bytes, 10, 0).is_err());
    }

    #[test]
    fn test_input_not_mutated() {
        let bytes = sample_pdf(4, 0);
        let copy = bytes.clone();
        let _ = split(&bytes, DEFAULT_MAX_SIZE_BYTES, 1).unwrap();
        assert_eq!(bytes, copy);
    }
}
