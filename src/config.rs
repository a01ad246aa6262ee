//! Runtime settings.
//!
//! Settings come from command-line flags, which clap backs with environment
//! variables; `.env` is loaded into the environment before parsing. This
//! module only holds the merged result and the defaults.

use crate::chunking::{ChunkLimits, PdfChunker, Sizing};
use crate::client::ClientConfig;
use crate::error::{Error, Result};
use crate::session::SessionConfig;
use std::path::Path;
use tracing::debug;

/// Everything needed to build a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Remote API connection.
    pub client: ClientConfig,
    /// Per-session toggles.
    pub session: SessionConfig,
    /// Chunk bounds.
    pub limits: ChunkLimits,
    /// Chunk size accounting.
    pub sizing: Sizing,
}

impl Settings {
    /// Returns a chunker for these settings.
    #[must_use]
    pub const fn chunker(&self) -> PdfChunker {
        PdfChunker::new(self.limits).with_sizing(self.sizing)
    }

    /// Checks values that clap cannot check on its own.
    ///
    /// The API key is not checked here; only remote calls require it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero chunk limit, a zero reply cap or
    /// an empty model name.
    pub fn validate(&self) -> Result<()> {
        self.limits
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;
        if self.client.max_tokens == 0 {
            return Err(Error::config("max_tokens must be > 0"));
        }
        if self.client.model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }
        Ok(())
    }
}

/// Loads `.env` from the current directory or the given file.
///
/// A missing file is not an error. Returns whether a file was loaded.
pub fn load_dotenv(path: Option<&Path>) -> bool {
    let loaded = match path {
        Some(p) => dotenvy::from_path(p).ok().map(|()| p.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    };
    if let Some(ref file) = loaded {
        debug!(path = %file.display(), "loaded environment file");
    }
    loaded.is_some()
}
