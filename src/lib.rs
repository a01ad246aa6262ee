//! # pdf-chat
//!
//! Chat with large PDF documents through a remote LLM document API.
//!
//! The API caps both the byte size and the page count of a document. PDFs
//! over either limit are split into contiguous page-range chunks, each a
//! standalone PDF; questions are then asked about one chunk at a time.
//!
//! ## Features
//!
//! - **Chunking**: Greedy page packing under size and page limits
//! - **Sessions**: Explicit per-user state with chunk selection and history
//! - **Remote API**: Document questions with prompt caching and token counting
//! - **Memory Mapping**: Efficient handling of large files

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod chunking;
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod session;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Chunk, Conversation, Document, Message, Role, parse_chunk_label};

// Re-export chunking types
pub use chunking::{ChunkLimits, PdfChunker, Sizing, available_strategies, split};

// Re-export client types
pub use client::{AnthropicClient, ClientConfig, DocumentChat, DocumentQuery};

// Re-export session types
pub use session::{Session, SessionConfig, SessionState};

// Re-export configuration
pub use config::Settings;

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
