//! Anthropic client implementation
//!
//! Async HTTP client for the Messages API with native tool calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::{Config, Message, Result, ToolCall, ToolDefinition, TrendwatchError};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Current API version header value
const API_VERSION: &str = "2023-06-01";

/// Messages API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

/// Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Messages API response
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    model: String,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

/// Content block in a response
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// Token usage in a response
#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Error body returned on non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl AnthropicClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()
            .map_err(|e| TrendwatchError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
        })
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4096,
        }
    }

    /// Convert an API response to LLMResponse
    fn to_llm_response(response: MessagesResponse) -> LLMResponse {
        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ResponseBlock::Text { text } => content.push_str(&text),
                ResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::new(id, name, input))
                }
                ResponseBlock::Other => {}
            }
        }

        LLMResponse {
            content,
            tool_calls,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
            model: response.model,
        }
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<LLMResponse> {
        let url = format!("{}/v1/messages", self.base_url);

        debug!(
            model = request.model,
            messages = request.messages.len(),
            tools = request.tools.map(|t| t.len()).unwrap_or(0),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| TrendwatchError::llm(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(TrendwatchError::llm(format!(
                    "API error ({}): {}",
                    err.error.error_type, err.error.message
                )));
            }
            return Err(TrendwatchError::llm(format!(
                "API error (HTTP {}): {}",
                status, body
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| TrendwatchError::llm(format!("Failed to parse response: {}", e)))?;

        Ok(Self::to_llm_response(body))
    }
}

#[async_trait]
impl LLMProvider for AnthropicClient {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let options = options.unwrap_or_default();
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            system: (!system_prompt.is_empty()).then_some(system_prompt),
            messages,
            tools: None,
            temperature: options.temperature,
        };

        self.send(&request).await
    }

    async fn chat_with_tools(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let options = options.unwrap_or_default();
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            system: (!system_prompt.is_empty()).then_some(system_prompt),
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            temperature: options.temperature,
        };

        self.send(&request).await
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_tool() -> ToolDefinition {
        ToolDefinition::new(
            "search_videos",
            "Search short videos",
            json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        )
    }

    #[tokio::test]
    async fn test_tool_use_response_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(json!({
                "system": "be brief",
                "tools": [{ "name": "search_videos" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "test-model",
                "content": [
                    { "type": "text", "text": "Looking that up." },
                    { "type": "tool_use", "id": "toolu_1", "name": "search_videos",
                      "input": { "query": "ferris" } }
                ],
                "usage": { "input_tokens": 12, "output_tokens": 8 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url(server.uri(), "test-key", "test-model");
        let response = client
            .chat_with_tools(
                "be brief",
                &[Message::user("find ferris videos")],
                &[search_tool()],
                None,
            )
            .await
            .unwrap();

        assert_eq!(response.content, "Looking that up.");
        assert_eq!(
            response.tool_calls,
            vec![ToolCall::new("toolu_1", "search_videos", json!({ "query": "ferris" }))]
        );
        assert_eq!(response.usage.unwrap().output_tokens, 8);
    }

    #[tokio::test]
    async fn test_unknown_blocks_are_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "test-model",
                "content": [
                    { "type": "thinking", "thinking": "hmm", "signature": "x" },
                    { "type": "text", "text": "done" }
                ]
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url(server.uri(), "k", "test-model");
        let response = client.chat("", &[Message::user("hi")], None).await.unwrap();
        assert_eq!(response.content, "done");
        assert!(response.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "type": "error",
                "error": { "type": "rate_limit_error", "message": "slow down" }
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url(server.uri(), "k", "test-model");
        let err = client
            .chat("", &[Message::user("hi")], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rate_limit_error"));
        assert!(err.to_string().contains("slow down"));
    }
}
