//! I/O utilities for pdf-chat.
//!
//! Reading PDF files (memory mapped when large), writing chunk PDFs, and
//! grapheme-aware helpers for terminal previews.

pub mod reader;
pub mod unicode;

pub use reader::{chunk_file_name, read_pdf, write_chunks};
pub use unicode::{preview, truncate_graphemes};
