//! Completion transport for the suggestion service.
//!
//! [`HttpTransport`] talks to an OpenAI-compatible `chat/completions`
//! endpoint. Tests and hosts can provide any other [`CompletionTransport`].

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport errors, classified as transient or not.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The service rate limited the request (HTTP 429).
    #[error("Rate limited by suggestion service")]
    RateLimited,

    /// The request timed out.
    #[error("Suggestion service timed out")]
    Timeout,

    /// The service could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service answered with a non-success status.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// The service answered but the body was not usable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether retrying later could succeed.
    ///
    /// Rate limiting, timeouts, connection failures and 5xx responses are
    /// transient. Other 4xx responses (bad request, auth) and unusable
    /// bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::RateLimited
            | TransportError::Timeout
            | TransportError::Connection(_) => true,
            TransportError::Http { status, .. } => *status >= 500,
            TransportError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else if e.is_decode() {
            TransportError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            TransportError::Connection(e.to_string())
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// One completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
}

/// Something that can turn a prompt into a free-text reply.
pub trait CompletionTransport {
    fn complete(&self, request: &CompletionRequest) -> TransportResult<String>;
}

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP transport for OpenAI-compatible chat completion APIs.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Create a transport with the given endpoint, key and request timeout.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionTransport for HttpTransport {
    fn complete(&self, request: &CompletionRequest) -> TransportResult<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|e| e.to_string());
            return Err(TransportError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json()?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatResponse) -> TransportResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| TransportError::InvalidResponse("No message content in response".into()))
}
