// Anthropic Messages API provider using reqwest-eventsource.
//
// Sends the turn prompt as a single user message with `stream: true` and
// accumulates the `content_block_delta` text until `message_stop`. Only the
// completion comes back (no echoed prompt), so label stripping on these turns
// usually reduces to a trim.

use async_trait::async_trait;
use debate_core::{GenerationParams, ModelProvider, ProviderError};
use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The Messages API caps temperature at 1.0.
const MAX_TEMPERATURE: f32 = 1.0;

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Streaming Claude client. One request per turn.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    label: String,
}

/// The accumulated result of one streamed message.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub full_text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl ClaudeClient {
    /// Create a new client with the given API key and model identifier.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_http(reqwest::Client::new(), api_key, model)
    }

    pub fn with_http(http: reqwest::Client, api_key: String, model: String) -> Self {
        let label = format!("anthropic/{model}");
        Self {
            http,
            api_key,
            model,
            endpoint: ANTHROPIC_API_URL.to_string(),
            label,
        }
    }

    /// Point the client at a different Messages endpoint (proxies, tests).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(&self, prompt: &str, params: &GenerationParams) -> Value {
        let temperature = if params.do_sample {
            params.temperature.min(MAX_TEMPERATURE)
        } else {
            0.0
        };
        serde_json::json!({
            "model": self.model,
            "max_tokens": params.max_new_tokens,
            "stream": true,
            "temperature": temperature,
            "messages": [{ "role": "user", "content": prompt }]
        })
    }

    /// Send `prompt` and stream the response to completion.
    ///
    /// Returns when `message_stop` arrives, the stream ends, or an error
    /// occurs. Partial text is kept if the stream ends without `message_stop`.
    pub async fn stream_message(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Unavailable(
                "API key not configured".to_string(),
            ));
        }

        let request = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(prompt, params));

        let mut es = request
            .eventsource()
            .map_err(|e| ProviderError::Request(format!("failed to create event source: {e}")))?;

        let mut completion = Completion {
            full_text: String::new(),
            input_tokens: 0,
            output_tokens: 0,
        };

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => match msg.event.as_str() {
                    "message_start" => {
                        match parse_input_tokens(&msg.data) {
                            Some(n) => completion.input_tokens = n,
                            None => warn!("failed to parse input_tokens from message_start"),
                        }
                    }
                    "content_block_delta" => {
                        if let Some(text) = parse_delta_text(&msg.data) {
                            completion.full_text.push_str(&text);
                        }
                    }
                    "message_delta" => {
                        if let Some(n) = parse_output_tokens(&msg.data) {
                            completion.output_tokens = n;
                        }
                    }
                    "message_stop" => {
                        debug!(
                            input_tokens = completion.input_tokens,
                            output_tokens = completion.output_tokens,
                            "message_stop"
                        );
                        es.close();
                        return Ok(completion);
                    }
                    "error" => {
                        es.close();
                        return Err(stream_error_event(&msg.data));
                    }
                    // ping, content_block_start, content_block_stop
                    other => {
                        debug!(event_type = other, "ignoring SSE event");
                    }
                },
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    es.close();
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    es.close();
                    let body = response.text().await.unwrap_or_default();
                    warn!(status = status.as_u16(), "Anthropic API returned an error status");
                    return Err(ProviderError::Status {
                        status: status.as_u16(),
                        message: api_error_message(&body)
                            .unwrap_or_else(|| status.to_string()),
                    });
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    es.close();
                    return Err(extract_error(&err));
                }
            }
        }

        // Stream ended without message_stop.
        if completion.full_text.is_empty() {
            Err(ProviderError::EmptyResponse)
        } else {
            Ok(completion)
        }
    }
}

#[async_trait]
impl ModelProvider for ClaudeClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        self.stream_message(prompt, params)
            .await
            .map(|c| c.full_text)
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `input_tokens` from a `message_start` event's JSON.
///
/// Expected shape: `{ "type": "message_start", "message": { "usage": { "input_tokens": N } } }`
pub(crate) fn parse_input_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("message")?
        .get("usage")?
        .get("input_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Extract `delta.text` from a `content_block_delta` event's JSON.
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `output_tokens` from a `message_delta` event's JSON.
pub(crate) fn parse_output_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("usage")?
        .get("output_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Pull `error.message` out of an API error body.
///
/// Expected shape: `{ "type": "error", "error": { "type": "...", "message": "..." } }`
pub(crate) fn api_error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// Map an in-stream `error` event. `overloaded_error` means the model is
/// unavailable rather than the request being wrong.
fn stream_error_event(data: &str) -> ProviderError {
    let v: Option<Value> = serde_json::from_str(data).ok();
    let kind = v
        .as_ref()
        .and_then(|v| v.get("error")?.get("type")?.as_str())
        .unwrap_or("");
    let message = api_error_message(data).unwrap_or_else(|| data.to_string());
    if kind == "overloaded_error" {
        ProviderError::Unavailable(message)
    } else {
        ProviderError::MalformedResponse(format!("stream error event: {message}"))
    }
}

/// Map a transport-level SSE error.
fn extract_error(err: &reqwest_eventsource::Error) -> ProviderError {
    match err {
        reqwest_eventsource::Error::Transport(e) if e.is_connect() => {
            ProviderError::Unavailable(format!("cannot reach model endpoint: {e}"))
        }
        reqwest_eventsource::Error::Transport(e) => {
            ProviderError::Request(format!("network error: {e}"))
        }
        reqwest_eventsource::Error::InvalidContentType(_, _) => {
            ProviderError::MalformedResponse("endpoint did not return an event stream".to_string())
        }
        other => ProviderError::Request(format!("stream error: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
