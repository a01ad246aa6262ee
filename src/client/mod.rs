//! Remote document API collaborators.
//!
//! The session talks to the remote model only through [`DocumentChat`], so
//! the HTTP client can be swapped for a scripted double in tests.

pub mod anthropic;

pub use anthropic::{AnthropicClient, ClientConfig};

use crate::core::Message;
use crate::error::Result;

/// Text sent to the token counter when the caller has none; the API
/// rejects empty text blocks.
pub const TOKEN_COUNT_PLACEHOLDER: &str = ".";

/// One question about one PDF.
#[derive(Debug, Clone)]
pub struct DocumentQuery<'a> {
    /// PDF bytes of the selected chunk.
    pub document: &'a [u8],
    /// The question being asked.
    pub question: &'a str,
    /// Earlier completed turns to send as context, oldest first.
    pub history: Vec<&'a Message>,
    /// Whether to ask the server to cache the document.
    pub cache: bool,
}

impl<'a> DocumentQuery<'a> {
    /// Creates a query with no history and no cache hint.
    #[must_use]
    pub const fn new(document: &'a [u8], question: &'a str) -> Self {
        Self {
            document,
            question,
            history: Vec::new(),
            cache: false,
        }
    }

    /// Sets the cache hint.
    #[must_use]
    pub const fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the history context.
    #[must_use]
    pub fn history(mut self, history: Vec<&'a Message>) -> Self {
        self.history = history;
        self
    }
}

/// A remote service that answers questions about PDF documents.
pub trait DocumentChat {
    /// Sends the document and question, returning the reply text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if credentials are missing and a
    /// remote error if the call fails.
    fn ask(&self, query: &DocumentQuery<'_>) -> Result<String>;

    /// Counts the input tokens of `document` plus `text`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if credentials are missing and a
    /// remote error if the call fails.
    fn count_tokens(&self, document: &[u8], text: &str) -> Result<u64>;

    /// Returns a short name for logs.
    fn name(&self) -> &'static str;
}

/// Returns `text`, or the placeholder if it is empty.
#[must_use]
pub fn token_count_text(text: &str) -> &str {
    if text.is_empty() {
        TOKEN_COUNT_PLACEHOLDER
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_count_text() {
        assert_eq!(token_count_text(""), ".");
        assert_eq!(token_count_text("summary"), "summary");
    }

    #[test]
    fn test_query_builder() {
        let message = Message::user("earlier");
        let query = DocumentQuery::new(b"%PDF", "why?")
            .cache(true)
            .history(vec![&message]);
        assert!(query.cache);
        assert_eq!(query.history.len(), 1);
        assert_eq!(query.question, "why?");
    }
}
