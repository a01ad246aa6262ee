//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::chunking::{ChunkLimits, DEFAULT_MAX_PAGES, DEFAULT_MAX_SIZE_MB, Sizing};
use crate::client::ClientConfig;
use crate::client::anthropic::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use crate::config::Settings;
use crate::error::Result;
use crate::session::SessionConfig;
use clap::builder::{PossibleValue, PossibleValuesParser};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// pdf-chat: ask questions about large PDF documents.
///
/// Documents that exceed the remote API's size or page limits are split
/// into page-range chunks; questions are asked about one chunk at a time.
#[derive(Parser, Debug)]
#[command(name = "pdf-chat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// API key for the document chat service.
    #[arg(long, env = "ANTHROPIC_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the API.
    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Model identifier.
    #[arg(long, env = "PDF_CHAT_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Maximum tokens in each reply.
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS, global = true)]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Disable the prompt-caching hint on the document.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Send earlier question/answer turns with each question.
    #[arg(long, global = true)]
    pub with_history: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Chunk limits shared by every document command.
#[derive(Args, Debug, Clone)]
pub struct ChunkArgs {
    /// Maximum chunk size in megabytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE_MB)]
    pub max_size_mb: usize,

    /// Maximum pages per chunk.
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Size accounting strategy.
    #[arg(long, default_value = "estimated", ignore_case = true, value_parser = sizing_values())]
    pub sizing: String,
}

/// Accepted `--sizing` values, each with its description in `--help`.
fn sizing_values() -> PossibleValuesParser {
    PossibleValuesParser::new(
        Sizing::ALL.map(|sizing| PossibleValue::new(sizing.name()).help(sizing.description())),
    )
}

impl Default for ChunkArgs {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_pages: DEFAULT_MAX_PAGES,
            sizing: Sizing::default().name().to_string(),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a PDF would be chunked.
    Chunks {
        /// Path to the PDF.
        file: PathBuf,

        /// Chunk limits.
        #[command(flatten)]
        limits: ChunkArgs,
    },

    /// Write every chunk of a PDF to its own file.
    Split {
        /// Path to the PDF.
        file: PathBuf,

        /// Output directory.
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Filename prefix.
        #[arg(long, default_value = "chunk")]
        prefix: String,

        /// Chunk limits.
        #[command(flatten)]
        limits: ChunkArgs,
    },

    /// Ask a single question about a PDF.
    Ask {
        /// Path to the PDF.
        file: PathBuf,

        /// The question.
        question: String,

        /// Chunk to ask about (number or label); required when the PDF has
        /// more than one chunk.
        #[arg(short, long)]
        chunk: Option<String>,

        /// Chunk limits.
        #[command(flatten)]
        limits: ChunkArgs,
    },

    /// Count the input tokens of a chunk plus optional text.
    Tokens {
        /// Path to the PDF.
        file: PathBuf,

        /// Text to count along with the chunk.
        text: Option<String>,

        /// Chunk to count (number or label).
        #[arg(short, long)]
        chunk: Option<String>,

        /// Chunk limits.
        #[command(flatten)]
        limits: ChunkArgs,
    },

    /// Start an interactive chat about a PDF.
    Chat {
        /// Path to the PDF.
        file: PathBuf,

        /// Chunk to start with (number or label).
        #[arg(short, long)]
        chunk: Option<String>,

        /// Chunk limits.
        #[command(flatten)]
        limits: ChunkArgs,
    },
}

impl Commands {
    /// Returns the chunk-limit flags of the command.
    #[must_use]
    pub const fn limits(&self) -> &ChunkArgs {
        match self {
            Self::Chunks { limits, .. }
            | Self::Split { limits, .. }
            | Self::Ask { limits, .. }
            | Self::Tokens { limits, .. }
            | Self::Chat { limits, .. } => limits,
        }
    }
}

impl Cli {
    /// Builds runtime settings from the parsed flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the sizing strategy is unknown or a value fails
    /// validation.
    pub fn settings(&self) -> Result<Settings> {
        let chunk_args = self.command.limits();
        let settings = Settings {
            client: ClientConfig {
                api_key: self.api_key.clone(),
                base_url: self.base_url.clone(),
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                timeout: Duration::from_secs(self.timeout_secs),
            },
            session: SessionConfig {
                prompt_caching: !self.no_cache,
                include_history: self.with_history,
            },
            limits: ChunkLimits::from_megabytes(chunk_args.max_size_mb, chunk_args.max_pages),
            sizing: chunk_args.sizing.parse()?,
        };
        settings.validate()?;
        Ok(settings)
    }
}
