//! CLI layer for pdf-chat.
//!
//! Provides the command-line interface using clap, with commands for
//! inspecting and splitting PDFs and for asking questions about them.

pub mod commands;
pub mod output;
pub mod parser;
pub mod repl;

pub use commands::{execute, open_session};
pub use output::OutputFormat;
pub use parser::{ChunkArgs, Cli, Commands};
pub use repl::{ReplCommand, run_repl};
