//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{Chunk, Conversation, Document, Message};
use crate::error::Error;
use crate::io::preview;
use serde::Serialize;
use std::fmt::Write;

/// Width of message previews in history listings.
const PREVIEW_WIDTH: usize = 72;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// JSON view of a chunk.
#[derive(Debug, Serialize)]
struct ChunkSummary {
    index: usize,
    label: String,
    start_page: usize,
    end_page: usize,
    pages: usize,
    size_bytes: usize,
}

impl From<&Chunk> for ChunkSummary {
    fn from(chunk: &Chunk) -> Self {
        Self {
            index: chunk.index,
            label: chunk.label(),
            start_page: chunk.start_page,
            end_page: chunk.end_page,
            pages: chunk.page_count(),
            size_bytes: chunk.size(),
        }
    }
}

/// Formats the chunk layout of a document.
#[must_use]
pub fn format_chunks(document: &Document, chunks: &[Chunk], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_chunks_text(document, chunks),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ChunksOutput {
                pages: usize,
                size_bytes: usize,
                chunks: Vec<ChunkSummary>,
            }
            format_json(&ChunksOutput {
                pages: document.page_count(),
                size_bytes: document.size(),
                chunks: chunks.iter().map(ChunkSummary::from).collect(),
            })
        }
    }
}

fn format_chunks_text(document: &Document, chunks: &[Chunk]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Document: {} pages, {}",
        document.page_count(),
        format_size(document.size())
    );

    if chunks.is_empty() {
        output.push_str("No chunks.\n");
        return output;
    }

    let _ = writeln!(output, "{} chunks:", chunks.len());
    for chunk in chunks {
        let _ = writeln!(
            output,
            "  {:<28} {:>5} pages  {:>10}",
            chunk.label(),
            chunk.page_count(),
            format_size(chunk.size())
        );
    }
    output
}

/// Formats the chunk list shown before a chunk has been chosen.
#[must_use]
pub fn format_chunk_labels(chunks: &[Chunk], active: Option<usize>) -> String {
    let mut output = String::new();
    for chunk in chunks {
        let marker = if active == Some(chunk.index) { '*' } else { ' ' };
        let _ = writeln!(
            output,
            "{marker} {:<28} {:>10}",
            chunk.label(),
            format_size(chunk.size())
        );
    }
    output
}

/// Formats an answer to a question.
#[must_use]
pub fn format_answer(chunk: &Chunk, question: &str, answer: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = answer.to_string();
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct AnswerOutput<'a> {
                chunk: String,
                question: &'a str,
                answer: &'a str,
            }
            format_json(&AnswerOutput {
                chunk: chunk.label(),
                question,
                answer,
            })
        }
    }
}

/// Formats a token count.
#[must_use]
pub fn format_token_count(chunk: &Chunk, tokens: u64, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{}: {tokens} input tokens\n", chunk.label()),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct TokenOutput {
                chunk: String,
                input_tokens: u64,
            }
            format_json(&TokenOutput {
                chunk: chunk.label(),
                input_tokens: tokens,
            })
        }
    }
}

/// Formats the result of writing chunk files.
#[must_use]
pub fn format_split_result(paths: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Wrote {} chunks:", paths.len());
            for path in paths {
                let _ = writeln!(output, "  {path}");
            }
            output
        }
        OutputFormat::Json => format_json(&paths),
    }
}

/// Formats the conversation history.
#[must_use]
pub fn format_history(conversation: &Conversation, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if conversation.is_empty() {
                return "No messages yet.\n".to_string();
            }
            let mut output = String::new();
            for (i, Message { role, content }) in conversation.messages().iter().enumerate() {
                let _ = writeln!(
                    output,
                    "{:>3}. {:<9} {}",
                    i + 1,
                    role.as_str(),
                    preview(content, PREVIEW_WIDTH)
                );
            }
            output
        }
        OutputFormat::Json => format_json(&conversation.messages()),
    }
}

/// Formats an error for display.
///
/// Text output is the bare message; JSON output is
/// `{"error": {"kind": ..., "message": ...}}`.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorBody {
                kind: &'static str,
                message: String,
            }
            #[derive(Serialize)]
            struct ErrorOutput {
                error: ErrorBody,
            }
            format_json(&ErrorOutput {
                error: ErrorBody {
                    kind: error.kind(),
                    message: error.to_string(),
                },
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::test_support::sample_pdf;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_format_chunks() {
        let document = Document::from_bytes(sample_pdf(3, 0)).unwrap();
        let chunks = vec![Chunk::new(0, 0, 2, vec![0; 10]), Chunk::new(1, 2, 3, vec![0; 5])];

        let text = format_chunks(&document, &chunks, OutputFormat::Text);
        assert!(text.contains("Document: 3 pages"));
        assert!(text.contains("2 chunks:"));
        assert!(text.contains("Pages 1-2 (Chunk 1)"));
        assert!(text.contains("Pages 3-3 (Chunk 2)"));

        let json: serde_json::Value =
            serde_json::from_str(&format_chunks(&document, &chunks, OutputFormat::Json)).unwrap();
        assert_eq!(json["pages"], 3);
        assert_eq!(json["chunks"][1]["start_page"], 2);
        assert_eq!(json["chunks"][1]["size_bytes"], 5);
        assert_eq!(json["chunks"][0]["label"], "Pages 1-2 (Chunk 1)");
    }

    #[test]
    fn test_format_chunk_labels_marks_active() {
        let chunks = vec![Chunk::new(0, 0, 2, Vec::new()), Chunk::new(1, 2, 3, Vec::new())];
        let text = format_chunk_labels(&chunks, Some(1));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("  Pages 1-2"));
        assert!(lines[1].starts_with("* Pages 3-3"));
    }

    #[test]
    fn test_format_history() {
        let mut conversation = Conversation::new();
        assert_eq!(
            format_history(&conversation, OutputFormat::Text),
            "No messages yet.\n"
        );

        conversation.push(Message::user("What is\nthis?"));
        conversation.push(Message::assistant("A report."));
        let text = format_history(&conversation, OutputFormat::Text);
        assert!(text.contains("1. user      What is this?"));
        assert!(text.contains("2. assistant A report."));

        let json: serde_json::Value =
            serde_json::from_str(&format_history(&conversation, OutputFormat::Json)).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[1]["content"], "A report.");
    }

    #[test]
    fn test_format_error_json() {
        let error = Error::Remote(RemoteError::Api {
            status: 429,
            message: "rate limited".to_string(),
        });
        let json: serde_json::Value =
            serde_json::from_str(&format_error(&error, OutputFormat::Json)).unwrap();
        assert_eq!(json["error"]["kind"], "remote_call");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("rate limited")
        );

        assert_eq!(format_error(&error, OutputFormat::Text), error.to_string());
    }

    #[test]
    fn test_format_token_count() {
        let chunk = Chunk::new(0, 0, 3, Vec::new());
        assert_eq!(
            format_token_count(&chunk, 1234, OutputFormat::Text),
            "Pages 1-3 (Chunk 1): 1234 input tokens\n"
        );
        let json: serde_json::Value =
            serde_json::from_str(&format_token_count(&chunk, 7, OutputFormat::Json)).unwrap();
        assert_eq!(json["input_tokens"], 7);
    }
}
