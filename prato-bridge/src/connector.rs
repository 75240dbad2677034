//! Chat connector for the external text-generation service.
//!
//! The connector is constructor-injected wherever narrative generation
//! happens; there is no process-wide configured client. Requests are
//! timeout-bounded by the HTTP client, retried a bounded number of times
//! on transient failures, and cancellable by dropping the future.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{BridgeError, BridgeResult};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: usize = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// A text-completion service. One method is all the boundary needs.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send a prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> BridgeResult<String>;
}

/// Connector configuration, resolved once at construction.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub max_attempts: usize,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Read `GEMINI_API_KEY` from the environment.
    pub fn from_env() -> BridgeResult<Self> {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(BridgeError::MissingApiKey),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Gemini `generateContent` client.
#[derive(Debug)]
pub struct GeminiChatService {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiChatService {
    pub fn new(config: GeminiConfig) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BridgeError::ClientBuild)?;
        Ok(Self { config, client })
    }

    async fn try_complete(&self, url: &str, body: &GenerateContentRequest<'_>) -> BridgeResult<String> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(BridgeError::EmptyCompletion)
    }
}

#[async_trait]
impl ChatService for GeminiChatService {
    async fn complete(&self, prompt: &str) -> BridgeResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(RETRY_BACKOFF * (attempt as u32 - 1)).await;
            }
            match self.try_complete(&url, &body).await {
                Ok(text) => return Ok(text),
                Err(err) if is_transient(&err) => {
                    log::warn!(
                        "narrative request attempt {attempt}/{} failed: {err}",
                        self.config.max_attempts
                    );
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }

        Err(BridgeError::RetriesExhausted {
            attempts: self.config.max_attempts,
            last_error,
        })
    }
}

/// Transient failures are retried; anything else surfaces immediately.
fn is_transient(err: &BridgeError) -> bool {
    match err {
        BridgeError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        BridgeError::ServiceStatus { status, .. } => *status >= 500 || *status == 429,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}
