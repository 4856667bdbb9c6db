// Text-generation inference provider.
//
// Talks to a Hugging Face style text-generation endpoint (hosted inference or
// a self-hosted TGI server). The request asks for `return_full_text`, so the
// output echoes the prompt just like a local causal LM's decoded output; the
// label stripper removes it.

use async_trait::async_trait;
use debate_core::{GenerationParams, ModelProvider, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    return_full_text: bool,
}

impl GenerateParameters {
    fn from_params(params: &GenerationParams) -> Self {
        // Sampling knobs are only sent when sampling; greedy servers reject
        // temperature 0 and ignore the rest.
        let (temperature, top_p) = if params.do_sample {
            (Some(params.temperature), Some(params.top_p))
        } else {
            (None, None)
        };
        GenerateParameters {
            max_new_tokens: params.max_new_tokens,
            do_sample: params.do_sample,
            temperature,
            top_p,
            return_full_text: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

/// Hosted inference returns a list; TGI's `/generate` returns one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Batch(Vec<Generated>),
    Single(Generated),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// ---------------------------------------------------------------------------
// TextGenerationClient
// ---------------------------------------------------------------------------

pub struct TextGenerationClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    label: String,
}

impl TextGenerationClient {
    pub fn new(endpoint: String, model: String, token: Option<String>) -> Self {
        Self::with_http(reqwest::Client::new(), endpoint, model, token)
    }

    pub fn with_http(
        http: reqwest::Client,
        endpoint: String,
        model: String,
        token: Option<String>,
    ) -> Self {
        TextGenerationClient {
            http,
            endpoint,
            token,
            label: format!("text-generation/{model}"),
        }
    }
}

#[async_trait]
impl ModelProvider for TextGenerationClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters::from_params(params),
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ProviderError::Unavailable(format!("cannot reach model endpoint: {e}"))
            } else {
                ProviderError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or_else(|_| status.to_string());
            warn!(status = status.as_u16(), %message, "text-generation endpoint returned an error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let generated = parse_generated_text(&text)?;
        debug!(output_len = generated.len(), "text-generation response");
        Ok(generated)
    }
}

/// Extract the first `generated_text` from a response body.
pub(crate) fn parse_generated_text(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    match parsed {
        GenerateResponse::Single(g) => Ok(g.generated_text),
        GenerateResponse::Batch(list) => list
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or(ProviderError::EmptyResponse),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
