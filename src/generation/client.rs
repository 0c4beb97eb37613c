//! Chat-completion clients.
//!
//! The requester only needs "system and user text in, raw model text out",
//! so the seam is the [`ModelClient`] trait. [`OpenAiClient`] speaks the
//! OpenAI chat-completions protocol over `reqwest`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Why a single model call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("authentication rejected ({status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ModelError {
    /// Classify a non-success HTTP status and its body.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Authentication { status, body },
            // OpenAI reports an exhausted balance as 429 with this error code
            429 if body.contains("insufficient_quota") => Self::QuotaExhausted(body),
            429 => Self::RateLimited(body),
            500..=599 => Self::Server { status, body },
            _ => Self::Rejected { status, body },
        }
    }

    /// Can retrying the same request plausibly succeed?
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_)
            | Self::Transport(_)
            | Self::RateLimited(_)
            | Self::Server { .. }
            | Self::MalformedResponse(_) => true,
            Self::Authentication { .. } | Self::QuotaExhausted(_) | Self::Rejected { .. } => false,
        }
    }
}

/// A language model that answers one system + user prompt pair.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and return the model's text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ModelError>;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for &T {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ModelError> {
        (**self).complete(system_prompt, user_prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// OpenAI chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn classify_transport(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::Transport(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

/// Message text of the first choice in a chat-completions response body.
fn first_choice_content(body: &str) -> Result<String, ModelError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::MalformedResponse(format!("unexpected response body: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ModelError::MalformedResponse("response has no message content".into()))
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": 0.7,
            "max_tokens": 4000,
            "response_format": {"type": "json_object"}
        });

        tracing::debug!(model = %self.model, endpoint = %self.endpoint(), "sending chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            return Err(ModelError::from_status(status.as_u16(), text));
        }

        let preview_end = text.char_indices().nth(1000).map_or(text.len(), |(i, _)| i);
        tracing::debug!("chat completion response: {}", &text[..preview_end]);

        first_choice_content(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ModelError::from_status(401, "bad key".into()),
            ModelError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            ModelError::from_status(429, r#"{"error":{"code":"insufficient_quota"}}"#.into()),
            ModelError::QuotaExhausted(_)
        ));
        assert!(ModelError::from_status(429, "slow down".into()).is_transient());
        assert!(ModelError::from_status(503, String::new()).is_transient());
        assert!(!ModelError::from_status(400, "bad request".into()).is_transient());
        assert!(!ModelError::from_status(403, String::new()).is_transient());
    }

    #[test]
    fn test_first_choice_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"slides\":[]}"}}]}"#;
        assert_eq!(first_choice_content(body).unwrap(), r#"{"slides":[]}"#);

        assert!(matches!(
            first_choice_content(r#"{"choices":[]}"#),
            Err(ModelError::MalformedResponse(_))
        ));
        assert!(matches!(
            first_choice_content("<html>gateway</html>"),
            Err(ModelError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiClient::new(
            "sk-test",
            "http://localhost:8080/v1/",
            DEFAULT_MODEL,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert!(!format!("{client:?}").contains("sk-test"));
    }
}
