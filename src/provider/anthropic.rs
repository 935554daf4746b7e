mod request;
mod response;

use rocket::async_trait;

use crate::provider::{
    anthropic::{
        request::{build_anthropic_messages, AnthropicMessage, AnthropicRequest},
        response::{AnthropicErrorResponse, AnthropicResponse},
    },
    ChatMessage, ChatProvider, LlmError, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

const MESSAGES_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Cheapest model, used for key checks
const TEST_MODEL: &str = "claude-3-haiku-20240307";

/// Anthropic chat provider
pub struct AnthropicProvider {
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(http_client: &reqwest::Client) -> Self {
        Self {
            client: http_client.clone(),
        }
    }

    async fn send_request(
        &self,
        api_key: &str,
        request: &AnthropicRequest<'_>,
    ) -> Result<AnthropicResponse, LlmError> {
        let response = self
            .client
            .post(MESSAGES_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::AnthropicError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicErrorResponse>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::AnthropicError(format!(
                "API error {}: {}",
                status, message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::AnthropicError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    async fn send_chat(
        &self,
        model: &str,
        system_prompt: &str,
        transcript: &[ChatMessage],
        api_key: &str,
    ) -> Result<String, LlmError> {
        let request = AnthropicRequest {
            model,
            messages: build_anthropic_messages(transcript),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: Some(DEFAULT_TEMPERATURE),
            system: Some(system_prompt),
        };
        let response = self.send_request(api_key, &request).await?;
        if let Some(usage) = &response.usage {
            rocket::debug!("Anthropic usage: {:?}", usage);
        }

        response.into_reply().ok_or(LlmError::NoResponse)
    }

    async fn test_key(&self, api_key: &str) -> Result<(), LlmError> {
        let request = AnthropicRequest {
            model: TEST_MODEL,
            messages: vec![AnthropicMessage {
                role: "user",
                content: "test",
            }],
            max_tokens: 1,
            temperature: None,
            system: None,
        };
        self.send_request(api_key, &request).await?;

        Ok(())
    }
}
