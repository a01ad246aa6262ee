//! Chat session orchestration.
//!
//! A [`Session`] owns everything a single user conversation needs: the
//! loaded document, its chunks, the active chunk selection, the message
//! history and the per-session toggles. The caller creates it at session
//! start and drops it at the end; nothing is shared between sessions.
//!
//! State machine: `Idle` until a document is loaded, then `Ready`. Each
//! question passes through `AwaitingReply` and always returns to `Ready`,
//! whether the remote call succeeds or not.

use crate::chunking::PdfChunker;
use crate::client::{DocumentChat, DocumentQuery};
use crate::core::{Chunk, Conversation, Document, Message};
use crate::error::{CommandError, DocumentError, Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No document loaded.
    Idle,
    /// Document loaded; questions may be asked once a chunk is active.
    Ready,
    /// A question has been sent and the reply is pending.
    AwaitingReply,
}

/// Per-session toggles that shape remote calls. They never affect chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    /// Ask the server to cache the document between calls.
    pub prompt_caching: bool,
    /// Send earlier completed turns along with each question.
    pub include_history: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt_caching: true,
            include_history: false,
        }
    }
}

/// One user's conversation with one document.
#[derive(Debug)]
pub struct Session<C: DocumentChat> {
    client: C,
    chunker: PdfChunker,
    config: SessionConfig,
    document: Option<Document>,
    chunks: Vec<Chunk>,
    active: Option<usize>,
    conversation: Conversation,
    state: SessionState,
}

impl<C: DocumentChat> Session<C> {
    /// Creates an idle session.
    #[must_use]
    pub const fn new(client: C, chunker: PdfChunker, config: SessionConfig) -> Self {
        Self {
            client,
            chunker,
            config,
            document: None,
            chunks: Vec::new(),
            active: None,
            conversation: Conversation::new(),
            state: SessionState::Idle,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the session toggles.
    #[must_use]
    pub const fn config(&self) -> SessionConfig {
        self.config
    }

    /// Turns the document cache hint on or off.
    pub const fn set_prompt_caching(&mut self, enabled: bool) {
        self.config.prompt_caching = enabled;
    }

    /// Turns history context on or off.
    pub const fn set_include_history(&mut self, enabled: bool) {
        self.config.include_history = enabled;
    }

    /// Returns the remote collaborator.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Returns the loaded document, if any.
    #[must_use]
    pub const fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Returns the chunks of the loaded document.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Returns the selection labels of all chunks, in order.
    #[must_use]
    pub fn chunk_labels(&self) -> Vec<String> {
        self.chunks.iter().map(Chunk::label).collect()
    }

    /// Returns the index of the active chunk.
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Returns the active chunk.
    #[must_use]
    pub fn active_chunk(&self) -> Option<&Chunk> {
        self.active.and_then(|i| self.chunks.get(i))
    }

    /// Returns the conversation history.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Loads a PDF and splits it into chunks.
    ///
    /// A single chunk becomes active immediately; with several chunks the
    /// caller must [`select_chunk`](Self::select_chunk) first. Loading a new
    /// document replaces the old one and its selection but keeps the
    /// history. On error the session is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the bytes are not a readable PDF and
    /// [`Error::Chunking`] if the chunk limits are invalid.
    pub fn load_document(&mut self, bytes: Vec<u8>) -> Result<&[Chunk]> {
        self.ensure_not_waiting()?;

        let document = Document::from_bytes(bytes)?;
        let chunks = self.chunker.split_document(&document)?;
        info!(
            pages = document.page_count(),
            chunks = chunks.len(),
            "document loaded"
        );

        self.active = (chunks.len() == 1).then_some(0);
        self.document = Some(document);
        self.chunks = chunks;
        self.state = SessionState::Ready;
        Ok(&self.chunks)
    }

    /// Makes chunk `index` (zero-based) the one questions are asked about.
    ///
    /// Only valid when the document has more than one chunk. History is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no multi-chunk document is loaded
    /// or `index` is out of range.
    pub fn select_chunk(&mut self, index: usize) -> Result<&Chunk> {
        self.ensure_ready()?;
        if self.chunks.len() <= 1 {
            return Err(Error::invalid_state(
                "the document has a single chunk; there is nothing to select",
            ));
        }
        if index >= self.chunks.len() {
            return Err(Error::invalid_state(format!(
                "chunk {} does not exist; the document has {} chunks",
                index + 1,
                self.chunks.len()
            )));
        }

        debug!(index, "chunk selected");
        self.active = Some(index);
        Ok(&self.chunks[index])
    }

    /// Asks a question about the active chunk.
    ///
    /// The question is appended to the history before the remote call. On
    /// success the reply is appended too; on failure the question stays in
    /// the history without a reply and the error is returned. Either way the
    /// session ends up `Ready`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] without touching the history if no
    /// chunk is active, [`Error::Document`] if the chunk no longer parses,
    /// and whatever the remote collaborator returns.
    pub fn ask(&mut self, question: &str) -> Result<&Message> {
        self.ensure_ready()?;
        let question = question.trim();
        if question.is_empty() {
            return Err(
                CommandError::InvalidArgument("question must not be empty".to_string()).into(),
            );
        }
        let Some(active) = self.active else {
            return Err(Error::invalid_state(format!(
                "the document was split into {} chunks; select one before asking",
                self.chunks.len()
            )));
        };

        self.conversation.push(Message::user(question));
        self.state = SessionState::AwaitingReply;

        let result = self.dispatch(active, question);
        self.state = SessionState::Ready;

        match result {
            Ok(reply) => {
                self.conversation.push(Message::assistant(reply));
                self.conversation
                    .last()
                    .ok_or_else(|| Error::invalid_state("reply was not recorded"))
            }
            Err(e) => {
                warn!(error = %e, "question failed");
                Err(e)
            }
        }
    }

    fn dispatch(&self, active: usize, question: &str) -> Result<String> {
        let chunk = self
            .chunks
            .get(active)
            .ok_or_else(|| Error::invalid_state("active chunk is missing"))?;
        lopdf::Document::load_mem(&chunk.bytes).map_err(DocumentError::from)?;

        let history = if self.config.include_history {
            self.conversation.completed_turns()
        } else {
            Vec::new()
        };
        let query = DocumentQuery::new(&chunk.bytes, question)
            .cache(self.config.prompt_caching)
            .history(history);

        debug!(
            client = self.client.name(),
            chunk = chunk.index,
            "dispatching question"
        );
        self.client.ask(&query)
    }

    /// Empties the conversation history.
    ///
    /// The document and chunk selection are kept. Does nothing while idle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] while a reply is pending.
    pub fn clear_history(&mut self) -> Result<()> {
        self.ensure_not_waiting()?;
        self.conversation.clear();
        Ok(())
    }

    /// Counts the input tokens of the active chunk plus `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if no chunk is active, otherwise
    /// whatever the remote collaborator returns.
    pub fn count_tokens(&self, text: &str) -> Result<u64> {
        self.ensure_ready()?;
        let chunk = self
            .active_chunk()
            .ok_or_else(|| Error::invalid_state("select a chunk before counting tokens"))?;
        self.client.count_tokens(&chunk.bytes, text)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Idle => Err(Error::invalid_state("no document loaded")),
            SessionState::AwaitingReply => {
                Err(Error::invalid_state("a question is already waiting for a reply"))
            }
        }
    }

    fn ensure_not_waiting(&self) -> Result<()> {
        if self.state == SessionState::AwaitingReply {
            return Err(Error::invalid_state(
                "a question is already waiting for a reply",
            ));
        }
        Ok(())
    }
}
