//! Outline requests: prompt, call, parse, retry.

use super::client::{ModelClient, ModelError};
use super::prompt::{OutlineRequest, system_prompt, user_prompt};
use super::retry::RetryPolicy;
use crate::outline::{PresentationOutline, TemplateConstraints, parse_outline};
use thiserror::Error;

/// Whether a failed generation was worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// Timeout, transport, rate limit, server error or unusable response;
    /// retried until the budget ran out
    Transient,
    /// Rejected credential, exhausted quota or refused request; not retried
    Permanent,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Transient => "transient/timeout",
            Self::Permanent => "authentication/quota",
        })
    }
}

/// A generation that produced no outline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{cause} failure after {attempts} attempt(s): {source}")]
pub struct GenerationFailure {
    pub cause: FailureCause,
    pub attempts: u32,
    pub source: ModelError,
}

/// Asks a model for an outline and parses the answer.
pub struct OutlineRequester<C> {
    client: C,
    policy: RetryPolicy,
}

impl<C: ModelClient> OutlineRequester<C> {
    pub fn new(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    #[inline]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Request an outline for `request`, telling the model about `constraints`.
    ///
    /// A response that is not an outline counts as a transient failure. The
    /// slide count is whatever the model returned; correcting it is left to
    /// adaptation.
    pub async fn request_outline(
        &self,
        request: &OutlineRequest,
        constraints: &TemplateConstraints,
    ) -> Result<PresentationOutline, GenerationFailure> {
        let system = system_prompt(request.tone, constraints);
        let user = user_prompt(request);

        tracing::info!(
            model = self.client.model_name(),
            topic = %request.topic,
            slides = request.slide_count,
            "requesting outline"
        );

        let result = self
            .policy
            .run(
                |attempt| {
                    let (system, user) = (&system, &user);
                    async move {
                        tracing::debug!(attempt, "calling model");
                        let raw = self.client.complete(system, user).await?;
                        parse_outline(&raw).map_err(|e| ModelError::MalformedResponse(e.to_string()))
                    }
                },
                ModelError::is_transient,
            )
            .await;

        match result {
            Ok(mut outline) => {
                if outline.topic.trim().is_empty() {
                    outline.topic = request.topic.trim().to_string();
                }
                tracing::info!(slides = outline.slides.len(), "outline received");
                Ok(outline)
            },
            Err(exhausted) => {
                let cause = if exhausted.error.is_transient() {
                    FailureCause::Transient
                } else {
                    FailureCause::Permanent
                };
                Err(GenerationFailure {
                    cause,
                    attempts: exhausted.attempts,
                    source: exhausted.error,
                })
            },
        }
    }
}
