//! Generation service: prompt in, text out.
//!
//! The service is an opaque, fallible collaborator. Handlers call it only
//! between `begin_request` and `complete_request`/`fail_request` on the
//! session store, so a failure always ends as a `failed` slot the user can
//! retry, never as an error that escapes the session.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiGenerator;

use crate::error::ExternalServiceError;
use crate::models::Prompt;

/// A prompt plus the sampling settings it should be sent with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: Prompt,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: Prompt, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt,
            temperature,
            max_tokens,
        }
    }
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ExternalServiceError>;
}
