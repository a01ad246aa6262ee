//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{
    OutputFormat, format_answer, format_chunks, format_split_result, format_token_count,
};
use crate::cli::parser::{Cli, Commands};
use crate::cli::repl::{resolve_chunk, run_repl};
use crate::client::{AnthropicClient, DocumentChat};
use crate::config::Settings;
use crate::core::{Chunk, Document};
use crate::error::{CommandError, Error, Result};
use crate::io::{read_pdf, write_chunks};
use crate::session::Session;
use std::io;
use std::path::Path;
use tracing::debug;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let settings = cli.settings()?;

    match &cli.command {
        Commands::Chunks { file, .. } => cmd_chunks(file, &settings, format),
        Commands::Split {
            file,
            out_dir,
            prefix,
            ..
        } => cmd_split(file, out_dir, prefix, &settings, format),
        Commands::Ask {
            file,
            question,
            chunk,
            ..
        } => {
            let client = AnthropicClient::new(settings.client.clone())?;
            cmd_ask(client, file, chunk.as_deref(), question, &settings, format)
        }
        Commands::Tokens {
            file, text, chunk, ..
        } => {
            let client = AnthropicClient::new(settings.client.clone())?;
            cmd_tokens(
                client,
                file,
                chunk.as_deref(),
                text.as_deref().unwrap_or_default(),
                &settings,
                format,
            )
        }
        Commands::Chat { file, chunk, .. } => {
            let client = AnthropicClient::new(settings.client.clone())?;
            cmd_chat(client, file, chunk.as_deref(), &settings)
        }
    }
}

/// Reads and parses a PDF, returning it with its chunks.
fn load_chunks(file: &Path, settings: &Settings) -> Result<(Document, Vec<Chunk>)> {
    let document = Document::from_bytes(read_pdf(file)?)?;
    let chunks = settings.chunker().split_document(&document)?;
    Ok((document, chunks))
}

fn cmd_chunks(file: &Path, settings: &Settings, format: OutputFormat) -> Result<String> {
    let (document, chunks) = load_chunks(file, settings)?;
    Ok(format_chunks(&document, &chunks, format))
}

fn cmd_split(
    file: &Path,
    out_dir: &Path,
    prefix: &str,
    settings: &Settings,
    format: OutputFormat,
) -> Result<String> {
    let (_, chunks) = load_chunks(file, settings)?;
    let paths = write_chunks(out_dir, &chunks, prefix)?;
    Ok(format_split_result(&paths, format))
}

/// Loads `file` into a new session and applies an optional chunk selector.
///
/// With a single chunk the selector may only name that chunk. With several
/// chunks and no selector the session is returned with nothing selected.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the selector
/// does not name an existing chunk.
pub fn open_session<C: DocumentChat>(
    client: C,
    file: &Path,
    chunk: Option<&str>,
    settings: &Settings,
) -> Result<Session<C>> {
    let bytes = read_pdf(file)?;
    let mut session = Session::new(client, settings.chunker(), settings.session);
    let chunk_count = session.load_document(bytes)?.len();

    if let Some(selector) = chunk {
        let index = resolve_chunk(selector)?;
        if chunk_count > 1 {
            session.select_chunk(index)?;
        } else if index != 0 {
            return Err(Error::invalid_state(format!(
                "chunk {} does not exist; the document has a single chunk",
                index + 1
            )));
        }
    }

    debug!(file = %file.display(), chunks = chunk_count, "session opened");
    Ok(session)
}

/// Fails with the list of labels when no chunk is active.
fn require_selection<C: DocumentChat>(session: &Session<C>) -> Result<&Chunk> {
    session.active_chunk().ok_or_else(|| {
        CommandError::InvalidArgument(format!(
            "the document was split into {} chunks; pass --chunk with one of: {}",
            session.chunks().len(),
            session.chunk_labels().join(", ")
        ))
        .into()
    })
}

/// Asks one question through `client`.
///
/// # Errors
///
/// Returns an error if the session cannot be opened, no chunk is selected
/// for a multi-chunk document, or the remote call fails.
pub fn cmd_ask<C: DocumentChat>(
    client: C,
    file: &Path,
    chunk: Option<&str>,
    question: &str,
    settings: &Settings,
    format: OutputFormat,
) -> Result<String> {
    let mut session = open_session(client, file, chunk, settings)?;
    require_selection(&session)?;

    let answer = session.ask(question)?.content.clone();
    let active = require_selection(&session)?;
    Ok(format_answer(active, question, &answer, format))
}

/// Counts tokens through `client`.
///
/// # Errors
///
/// Returns an error if the session cannot be opened, no chunk is selected
/// for a multi-chunk document, or the remote call fails.
pub fn cmd_tokens<C: DocumentChat>(
    client: C,
    file: &Path,
    chunk: Option<&str>,
    text: &str,
    settings: &Settings,
    format: OutputFormat,
) -> Result<String> {
    let session = open_session(client, file, chunk, settings)?;
    let active = require_selection(&session)?;
    let tokens = session.count_tokens(text)?;
    Ok(format_token_count(active, tokens, format))
}

fn cmd_chat<C: DocumentChat>(
    client: C,
    file: &Path,
    chunk: Option<&str>,
    settings: &Settings,
) -> Result<String> {
    let mut session = open_session(client, file, chunk, settings)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl(&mut session, stdin.lock(), &mut stdout)?;
    Ok(String::new())
}
