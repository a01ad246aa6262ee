//! Interactive chat loop.
//!
//! Each input line is either a question about the active chunk or a slash
//! command. Errors are printed and the loop continues; it ends on `/quit`
//! or end of input.

use crate::cli::output::{OutputFormat, format_chunk_labels, format_history};
use crate::client::DocumentChat;
use crate::core::{Chunk, parse_chunk_label};
use crate::error::{CommandError, Error, Result};
use crate::session::Session;
use std::io::{BufRead, Write};
use tracing::debug;

const PROMPT: &str = "> ";

const HELP: &str = "\
Type a question to ask about the active chunk, or a command:
  /chunks            list chunks (* marks the active one)
  /select <n|label>  make a chunk active
  /clear             forget the conversation
  /history           show the conversation
  /tokens [text]     count input tokens of the active chunk plus text
  /caching on|off    toggle the document cache hint
  /help              show this help
  /quit              leave
";

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// List chunks.
    Chunks,
    /// Select a chunk by number or label.
    Select(String),
    /// Clear the history.
    Clear,
    /// Show the history.
    History,
    /// Count tokens with optional text.
    Tokens(String),
    /// Toggle prompt caching.
    Caching(bool),
    /// Show help.
    Help,
    /// Leave the loop.
    Quit,
}

impl ReplCommand {
    /// Parses a line starting with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidArgument`] for unknown commands or
    /// missing arguments.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let body = line.strip_prefix('/').unwrap_or(line);
        let (name, arg) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(n, a)| (n, a.trim()));

        let command = match name.to_lowercase().as_str() {
            "chunks" => Self::Chunks,
            "select" if arg.is_empty() => return Err(invalid("usage: /select <n|label>")),
            "select" => Self::Select(arg.to_string()),
            "clear" => Self::Clear,
            "history" => Self::History,
            "tokens" => Self::Tokens(arg.to_string()),
            "caching" => match arg.to_lowercase().as_str() {
                "on" => Self::Caching(true),
                "off" => Self::Caching(false),
                _ => return Err(invalid("usage: /caching on|off")),
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(invalid(format!("unknown command: /{name} (try /help)"))),
        };
        Ok(command)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    CommandError::InvalidArgument(message.into()).into()
}

/// Resolves a user chunk selector to a zero-based index.
///
/// # Errors
///
/// Returns [`CommandError::InvalidArgument`] if the selector is neither a
/// chunk number nor a chunk label.
pub fn resolve_chunk(selector: &str) -> Result<usize> {
    parse_chunk_label(selector).ok_or_else(|| {
        invalid(format!(
            "invalid chunk '{selector}': expected a chunk number starting at 1 or a label"
        ))
    })
}

/// Runs the loop until `/quit` or end of input.
///
/// The session must already have a document loaded.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run_repl<C, R, W>(session: &mut Session<C>, input: R, output: &mut W) -> Result<()>
where
    C: DocumentChat,
    R: BufRead,
    W: Write,
{
    write_intro(session, output)?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            write!(output, "{PROMPT}")?;
            output.flush()?;
            continue;
        }

        if line.starts_with('/') {
            match ReplCommand::parse(line) {
                Ok(ReplCommand::Quit) => break,
                Ok(command) => run_command(session, command, output)?,
                Err(e) => writeln!(output, "error: {e}")?,
            }
        } else {
            match session.ask(line) {
                Ok(reply) => writeln!(output, "{}\n", reply.content)?,
                Err(e) => writeln!(output, "error: {e}")?,
            }
        }

        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    writeln!(output)?;
    debug!(messages = session.conversation().len(), "chat ended");
    Ok(())
}

fn write_intro<C: DocumentChat, W: Write>(session: &Session<C>, output: &mut W) -> Result<()> {
    if let Some(document) = session.document() {
        writeln!(
            output,
            "Loaded {} pages in {} chunk(s).",
            document.page_count(),
            session.chunks().len()
        )?;
    }

    if session.active_chunk().is_some() {
        write_token_count(session, "", output)?;
    } else {
        output.write_all(format_chunk_labels(session.chunks(), None).as_bytes())?;
        writeln!(output, "Select a chunk with /select <n> before asking.")?;
    }
    writeln!(output, "Type /help for commands.")?;
    write!(output, "{PROMPT}")?;
    output.flush()?;
    Ok(())
}

fn run_command<C: DocumentChat, W: Write>(
    session: &mut Session<C>,
    command: ReplCommand,
    output: &mut W,
) -> Result<()> {
    match command {
        ReplCommand::Chunks => {
            let labels = format_chunk_labels(session.chunks(), session.active_index());
            output.write_all(labels.as_bytes())?;
        }
        ReplCommand::Select(selector) => {
            let selected = resolve_chunk(&selector)
                .and_then(|index| session.select_chunk(index).map(Chunk::label));
            match selected {
                Ok(label) => {
                    writeln!(output, "Selected {label}.")?;
                    write_token_count(session, "", output)?;
                }
                Err(e) => writeln!(output, "error: {e}")?,
            }
        }
        ReplCommand::Clear => match session.clear_history() {
            Ok(()) => writeln!(output, "History cleared.")?,
            Err(e) => writeln!(output, "error: {e}")?,
        },
        ReplCommand::History => {
            let history = format_history(session.conversation(), OutputFormat::Text);
            output.write_all(history.as_bytes())?;
        }
        ReplCommand::Tokens(text) => write_token_count(session, &text, output)?,
        ReplCommand::Caching(enabled) => {
            session.set_prompt_caching(enabled);
            writeln!(
                output,
                "Prompt caching {}.",
                if enabled { "enabled" } else { "disabled" }
            )?;
        }
        ReplCommand::Help => output.write_all(HELP.as_bytes())?,
        ReplCommand::Quit => {}
    }
    Ok(())
}

/// Token-count failures are shown as warnings; they never end the loop.
fn write_token_count<C: DocumentChat, W: Write>(
    session: &Session<C>,
    text: &str,
    output: &mut W,
) -> Result<()> {
    match session.count_tokens(text) {
        Ok(tokens) => {
            let label = session.active_chunk().map(Chunk::label).unwrap_or_default();
            writeln!(output, "{label}: {tokens} input tokens")?;
        }
        Err(e) => writeln!(output, "warning: could not count tokens: {e}")?,
    }
    Ok(())
}
