use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scout_core::config::CompletionConfig;

/// One fully constructed completion request. Built deterministically by the
/// dispatcher; the client sends it without further shaping.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_content: String,
    pub model: String,
    pub temperature: Option<f32>,
}

/// Failure of the completion upstream. Carried to the caller as-is; the
/// dispatcher never retries, so each variant describes the single attempted
/// call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("completion transport failed: {0}")]
    Transport(String),
    #[error("completion call timed out")]
    Timeout,
    #[error("completion upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response was malformed: {0}")]
    MalformedResponse(String),
}

/// The external text-completion collaborator. Exactly one `complete` call is
/// made per inbound request.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionPayload<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Reqwest-backed client for an OpenAI-compatible `/chat/completions`
/// endpoint. Credentials are injected at construction and never logged.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| UpstreamError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let payload = ChatCompletionPayload {
            model: &request.model,
            messages: [
                ChatMessage { role: "system", content: &request.system_instruction },
                ChatMessage { role: "user", content: &request.user_content },
            ],
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|error| {
            if error.is_timeout() {
                UpstreamError::Timeout
            } else {
                UpstreamError::MalformedResponse(error.to_string())
            }
        })?;

        first_choice_text(parsed)
    }
}

fn first_choice_text(response: ChatCompletionResponse) -> Result<String, UpstreamError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| UpstreamError::MalformedResponse("response contained no choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        first_choice_text, ChatChoice, ChatChoiceMessage, ChatCompletionPayload,
        ChatCompletionResponse, ChatMessage, HttpCompletionClient, UpstreamError,
    };
    use scout_core::config::CompletionConfig;

    fn config() -> CompletionConfig {
        CompletionConfig {
            api_key: "gsk-test".to_string().into(),
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            model: "llama3-70b-8192".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn endpoint_joins_base_url_without_duplicate_slash() {
        let client = HttpCompletionClient::new(&config()).expect("client should build");
        assert_eq!(client.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
    }

    #[test]
    fn payload_serializes_to_chat_completions_shape() {
        let payload = ChatCompletionPayload {
            model: "llama3-70b-8192",
            messages: [
                ChatMessage { role: "system", content: "persona" },
                ChatMessage { role: "user", content: "hello" },
            ],
            temperature: None,
        };

        let json = serde_json::to_value(&payload).expect("payload should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama3-70b-8192",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "hello"},
                ],
            })
        );
    }

    #[test]
    fn first_choice_text_returns_content_verbatim() {
        let response = ChatCompletionResponse {
            choices: vec![ChatChoice {
                message: ChatChoiceMessage { content: Some("  Hi there!  ".to_string()) },
            }],
        };
        assert_eq!(first_choice_text(response), Ok("  Hi there!  ".to_string()));
    }

    #[test]
    fn empty_choices_surface_as_malformed_response() {
        let response = ChatCompletionResponse { choices: vec![] };
        assert!(matches!(first_choice_text(response), Err(UpstreamError::MalformedResponse(_))));
    }

    #[test]
    fn missing_content_surfaces_as_malformed_response() {
        let response = ChatCompletionResponse {
            choices: vec![ChatChoice { message: ChatChoiceMessage { content: None } }],
        };
        assert!(matches!(first_choice_text(response), Err(UpstreamError::MalformedResponse(_))));
    }
}
