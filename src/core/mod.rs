//! Core domain models for pdf-chat.
//!
//! Documents, chunks and conversation history. These are plain data types
//! with no network dependencies.

pub mod chunk;
pub mod document;
pub mod message;

pub use chunk::{Chunk, parse_chunk_label};
pub use document::{BYTES_PER_MB, Document};
pub use message::{Conversation, Message, Role};
