//! PDF chunking for pdf-chat.
//!
//! Remote document APIs cap both the request size and the page count of an
//! attached PDF. This module splits a document into contiguous page ranges
//! that respect both caps:
//!
//! - **Splitter**: greedy in-order packing of pages into chunks
//! - **Sizing**: how the running size of a chunk is accounted
//! - **Subset**: serializing a page range as a standalone PDF

pub mod sizing;
pub mod splitter;
pub mod subset;

pub use sizing::{Sizing, available_strategies};
pub use splitter::{ChunkLimits, PdfChunker, split};
pub use subset::PageSource;

/// Default maximum chunk size in megabytes.
pub const DEFAULT_MAX_SIZE_MB: usize = 32;

/// Default maximum chunk size in bytes (32 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: usize = DEFAULT_MAX_SIZE_MB * 1024 * 1024;

/// Default maximum pages per chunk.
pub const DEFAULT_MAX_PAGES: usize = 100;
