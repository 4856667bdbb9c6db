// HTTP model providers and the factory that builds one from config.

pub mod anthropic;
pub mod text_generation;

use std::sync::Arc;

use debate_core::config::{Backend, Config};
use debate_core::{LoadError, ModelProvider};
use tracing::info;

use anthropic::ClaudeClient;
use text_generation::TextGenerationClient;

/// Build the configured provider. Called once at startup; the result is
/// shared by every debate for the life of the process.
pub fn build_provider(config: &Config) -> Result<Arc<dyn ModelProvider>, LoadError> {
    let model = config.model.name.trim();
    if model.is_empty() {
        return Err(LoadError::MissingModel);
    }

    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| LoadError::HttpClient(e.to_string()))?;

    let provider: Arc<dyn ModelProvider> = match config.model.backend {
        Backend::Anthropic => {
            let api_key = match &config.credentials.anthropic_api_key {
                Some(key) if !key.is_empty() => key.clone(),
                _ => {
                    return Err(LoadError::MissingApiKey {
                        backend: Backend::Anthropic.as_str().to_string(),
                    })
                }
            };
            let endpoint = config
                .model
                .endpoint
                .clone()
                .unwrap_or_else(|| anthropic::ANTHROPIC_API_URL.to_string());
            check_endpoint(&endpoint)?;
            Arc::new(ClaudeClient::with_http(http, api_key, model.to_string()).endpoint(endpoint))
        }
        Backend::TextGeneration => {
            let endpoint = config.model.endpoint.clone().unwrap_or_default();
            check_endpoint(&endpoint)?;
            let token = config
                .credentials
                .hf_api_token
                .clone()
                .filter(|t| !t.is_empty());
            Arc::new(TextGenerationClient::with_http(
                http,
                endpoint,
                model.to_string(),
                token,
            ))
        }
    };

    info!(provider = provider.name(), "model provider ready");
    Ok(provider)
}

/// Reject endpoints that are not absolute http(s) URLs.
fn check_endpoint(url: &str) -> Result<(), LoadError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| LoadError::InvalidEndpoint {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(LoadError::InvalidEndpoint {
            url: url.to_string(),
            message: format!("unsupported scheme `{other}`"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
