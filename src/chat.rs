//! Chat adapter for a hosted OpenAI-compatible completion API
//!
//! Sends the user's message to the configured `/chat/completions` endpoint
//! and returns the first choice's content. Sampling parameters are passed
//! through verbatim; `top_k`, `presence_penalty`, and `max_tokens` may be
//! silently ignored by some providers.
//!
//! Every request is attempted exactly once. There is no retry logic:
//! transient and permanent upstream failures surface the same way.

use serde::{Deserialize, Serialize};

use crate::error::{EntenderError, Result};

/// Default hosted API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.studio.nebius.com/v1";

/// Default hosted model identifier
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct";

/// Sampling parameters forwarded to the hosted API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling probability mass
    pub top_p: f32,
    /// Top-k cutoff (may be ignored upstream)
    pub top_k: u32,
    /// Presence penalty (may be ignored upstream)
    pub presence_penalty: f32,
    /// Maximum tokens to generate (may be ignored upstream)
    pub max_tokens: u32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 50,
            presence_penalty: 0.0,
            max_tokens: 200,
        }
    }
}

/// One message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user", "assistant", or "system"
    pub role: String,
    /// Message text
    pub content: String,
}

/// Wire request for the hosted chat completion endpoint
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    presence_penalty: f32,
    max_tokens: u32,
}

/// Wire response from the hosted chat completion endpoint
#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for a hosted OpenAI-compatible chat completion API
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// The credential is not validated here; a bad or missing key fails
    /// at call time with whatever the upstream API answers.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Hosted model identifier this client talks to
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request a chat completion for a single user message
    ///
    /// # Errors
    ///
    /// - [`EntenderError::Connection`] on transport failure or an
    ///   unparseable response body
    /// - [`EntenderError::ChatApi`] when the upstream answers a non-2xx
    ///   status or an empty choice list
    pub async fn complete(&self, message: &str, params: &ChatParams) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: message.to_string(),
            }],
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            presence_penalty: params.presence_penalty,
            max_tokens: params.max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EntenderError::Connection {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EntenderError::ChatApi {
                status: status.as_u16(),
                reason: body,
            });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| EntenderError::Connection {
                url,
                reason: format!("Failed to parse response: {e}"),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EntenderError::ChatApi {
                status: status.as_u16(),
                reason: "Response contained no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ChatParams::default();
        assert!((params.temperature - 0.7).abs() < 1e-6);
        assert!((params.top_p - 0.9).abs() < 1e-6);
        assert_eq!(params.top_k, 50);
        assert!((params.presence_penalty - 0.0).abs() < 1e-6);
        assert_eq!(params.max_tokens, 200);
    }

    #[test]
    fn test_request_serialization_includes_passthrough_params() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            temperature: 0.7,
            top_p: 0.9,
            top_k: 50,
            presence_penalty: 0.0,
            max_tokens: 200,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"top_k\":50"));
        assert!(json.contains("\"presence_penalty\""));
        assert!(json.contains("\"max_tokens\":200"));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hello");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ChatClient::new("https://example.com/v1/", "key", "model");
        assert_eq!(client.base_url.trim_end_matches('/'), "https://example.com/v1");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let client = ChatClient::new("http://127.0.0.1:1", "key", "model");
        let result = client.complete("hi", &ChatParams::default()).await;
        assert!(matches!(result, Err(EntenderError::Connection { .. })));
    }
}
