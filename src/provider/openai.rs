mod request;
mod response;

use rocket::async_trait;

use crate::provider::{
    openai::{
        request::{build_openai_messages, OpenAIRequest},
        response::OpenAIResponse,
    },
    ChatMessage, ChatProvider, LlmError, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

const API_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat provider
pub struct OpenAIProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(http_client: &reqwest::Client, base_url: Option<&str>) -> Self {
        Self {
            client: http_client.clone(),
            base_url: base_url.unwrap_or(API_BASE_URL).to_owned(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    async fn send_chat(
        &self,
        model: &str,
        system_prompt: &str,
        transcript: &[ChatMessage],
        api_key: &str,
    ) -> Result<String, LlmError> {
        let request = OpenAIRequest {
            model,
            messages: build_openai_messages(system_prompt, transcript),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::OpenAIError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::OpenAIError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LlmError::OpenAIError(format!("Failed to parse response: {}", e)))?;
        if let Some(usage) = &body.usage {
            rocket::debug!("OpenAI usage: {:?}", usage);
        }

        body.into_reply().ok_or(LlmError::NoResponse)
    }

    async fn test_key(&self, api_key: &str) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| LlmError::OpenAIError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::OpenAIError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
