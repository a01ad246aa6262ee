//! Anthropic Messages API client.
//!
//! Sends PDFs as base64 `document` content blocks. Uses the blocking
//! `reqwest` client: every call is a single request/response and the caller
//! waits for it.

use crate::client::{DocumentChat, DocumentQuery, token_count_text};
use crate::core::Role;
use crate::error::{Error, RemoteError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default reply length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PDF_BETA: &str = "pdfs-2024-09-25";
const PROMPT_CACHING_BETA: &str = "prompt-caching-2024-07-31";
const TOKEN_COUNTING_BETA: &str = "token-counting-2024-11-01";

/// Connection settings for [`AnthropicClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API key; calls fail with a configuration error while it is unset.
    pub api_key: Option<String>,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens in a reply.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Blocking client for the Messages and token-counting endpoints.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: ClientConfig,
    http: Client,
}

impl AnthropicClient {
    /// Creates a client.
    ///
    /// A missing API key is not an error here; it is reported by the first
    /// remote call.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::config(format!(
                "{API_KEY_ENV} is not set; add it to your environment or .env file"
            ))),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn post<T: Serialize>(&self, path: &str, betas: &[&str], body: &T) -> Result<String> {
        let api_key = self.api_key()?;
        let response = self
            .http
            .post(self.endpoint(path))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", betas.join(","))
            .json(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), path, "remote call rejected");
            return Err(api_error(status.as_u16(), &text).into());
        }
        Ok(text)
    }
}

impl DocumentChat for AnthropicClient {
    fn ask(&self, query: &DocumentQuery<'_>) -> Result<String> {
        debug!(
            model = %self.config.model,
            document_bytes = query.document.len(),
            history = query.history.len(),
            cache = query.cache,
            "asking about document"
        );

        let mut betas = vec![PDF_BETA];
        if query.cache {
            betas.push(PROMPT_CACHING_BETA);
        }
        let body = messages_request(&self.config, query);
        let text = self.post("/v1/messages", &betas, &body)?;
        parse_reply(&text)
    }

    fn count_tokens(&self, document: &[u8], text: &str) -> Result<u64> {
        let body = count_tokens_request(&self.config, document, text);
        let response = self.post(
            "/v1/messages/count_tokens",
            &[TOKEN_COUNTING_BETA, PDF_BETA],
            &body,
        )?;
        let parsed: CountTokensResponse =
            serde_json::from_str(&response).map_err(RemoteError::from)?;
        Ok(parsed.input_tokens)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// ==================== Wire Format ====================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct CountTokensRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Document {
        source: DocumentSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct DocumentSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct CountTokensResponse {
    input_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

fn document_block<'a>(document: &[u8], cache: bool) -> ContentBlock<'a> {
    ContentBlock::Document {
        source: DocumentSource {
            kind: "base64",
            media_type: "application/pdf",
            data: STANDARD.encode(document),
        },
        cache_control: cache.then_some(CacheControl { kind: "ephemeral" }),
    }
}

fn messages_request<'a>(
    config: &'a ClientConfig,
    query: &DocumentQuery<'a>,
) -> MessagesRequest<'a> {
    let mut messages: Vec<WireMessage<'a>> = query
        .history
        .iter()
        .map(|&message| WireMessage {
            role: message.role,
            content: vec![ContentBlock::Text {
                text: message.content.as_str(),
            }],
        })
        .collect();

    messages.push(WireMessage {
        role: Role::User,
        content: vec![
            document_block(query.document, query.cache),
            ContentBlock::Text {
                text: query.question,
            },
        ],
    });

    MessagesRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        messages,
    }
}

fn count_tokens_request<'a>(
    config: &'a ClientConfig,
    document: &[u8],
    text: &'a str,
) -> CountTokensRequest<'a> {
    CountTokensRequest {
        model: &config.model,
        messages: vec![WireMessage {
            role: Role::User,
            content: vec![
                document_block(document, false),
                ContentBlock::Text {
                    text: token_count_text(text),
                },
            ],
        }],
    }
}

fn parse_reply(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(RemoteError::from)?;
    match response.content.into_iter().next() {
        Some(ResponseBlock::Text { text }) => Ok(text),
        Some(ResponseBlock::Other) => Err(RemoteError::MalformedResponse(
            "first content block is not text".to_string(),
        )
        .into()),
        None => Err(RemoteError::MalformedResponse("empty content".to_string()).into()),
    }
}

fn api_error(status: u16, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| body.trim().to_string(),
        |parsed| format!("{}: {}", parsed.error.kind, parsed.error.message),
    );
    RemoteError::Api { status, message }
}
