// Model provider seam.
//
// A provider turns a prompt into continuation text. It is constructed once at
// startup (see `debate_llm::build_provider`) and injected into the
// orchestrator as `Arc<dyn ModelProvider>`, so tests can swap in stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Generation parameters
// ---------------------------------------------------------------------------

/// Token budget and sampling parameters for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum number of tokens the model may produce.
    pub max_new_tokens: u32,
    /// Greedy decoding when false; `temperature`/`top_p` are ignored then.
    #[serde(default)]
    pub do_sample: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            max_new_tokens: 150,
            do_sample: false,
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The provider could not be constructed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no API key configured for the {backend} backend")]
    MissingApiKey { backend: String },

    #[error("model name must not be blank")]
    MissingModel,

    #[error("invalid endpoint `{url}`: {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A single generation call failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The model cannot serve requests at all (not configured, still loading,
    /// overloaded, out of memory).
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("model returned no content")]
    EmptyResponse,
}

impl ProviderError {
    /// True for failures that mean the model itself is not serving.
    pub fn is_unavailable(&self) -> bool {
        match self {
            ProviderError::Unavailable(_) => true,
            // 503 (loading / overloaded) and 529 (overloaded) mean no model to talk to.
            ProviderError::Status { status, .. } => matches!(status, 503 | 529),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short human-readable identifier (backend and model) for logs and UI.
    fn name(&self) -> &str;

    /// Generate a continuation for `prompt`.
    ///
    /// Backends that echo the prompt (text-generation with
    /// `return_full_text`) return it as part of the text; the post-processor
    /// strips it.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;
}
