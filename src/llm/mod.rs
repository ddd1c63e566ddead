//! Text-generation capability.
//!
//! Synthesis depends only on [`CompletionClient`]; the HTTP implementation lives
//! in [`openai`] and tests substitute scripted clients.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::synthesis::repair::{excerpt, EXCERPT_CHARS};

pub use openai::OpenAiClient;

/// Generation endpoint failures.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Generation endpoint rejected credentials: {}", excerpt(.0, EXCERPT_CHARS))]
    Unauthorized(String),

    #[error("Generation endpoint rate limit exceeded: {}", excerpt(.0, EXCERPT_CHARS))]
    RateLimited(String),

    #[error("Generation endpoint returned {status}: {}", excerpt(.body, EXCERPT_CHARS))]
    Rejected { status: u16, body: String },

    #[error("Generation endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation endpoint returned no completion")]
    EmptyResponse,
}

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1500,
        }
    }
}

/// A text-generation endpoint: prompt in, raw text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, params: GenerationParams)
        -> Result<String, UpstreamError>;
}
