//! Outline generation: prompts, the model client, and retries around it.

pub mod client;
pub mod prompt;
pub mod requester;
pub mod retry;

pub use client::{ModelClient, ModelError, OpenAiClient};
pub use prompt::{OutlineRequest, Tone};
pub use requester::{FailureCause, GenerationFailure, OutlineRequester};
pub use retry::RetryPolicy;
