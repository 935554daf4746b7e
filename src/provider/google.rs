mod request;
mod response;

use rocket::async_trait;

use crate::provider::{
    google::{
        request::{
            build_google_contents, GoogleContent, GoogleGenerationConfig, GooglePart,
            GoogleRequest,
        },
        response::GoogleResponse,
    },
    ChatMessage, ChatProvider, LlmError, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used for key checks
const TEST_MODEL: &str = "gemini-pro";

/// Google Gemini chat provider
pub struct GoogleProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(http_client: &reqwest::Client, base_url: Option<&str>) -> Self {
        Self {
            client: http_client.clone(),
            base_url: base_url.unwrap_or(API_BASE_URL).to_owned(),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GoogleRequest<'_>,
    ) -> Result<GoogleResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::GoogleError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::GoogleError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::GoogleError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ChatProvider for GoogleProvider {
    async fn send_chat(
        &self,
        model: &str,
        system_prompt: &str,
        transcript: &[ChatMessage],
        api_key: &str,
    ) -> Result<String, LlmError> {
        let request = GoogleRequest {
            system_instruction: Some(GoogleContent {
                role: None,
                parts: vec![GooglePart {
                    text: system_prompt,
                }],
            }),
            contents: build_google_contents(transcript),
            generation_config: Some(GoogleGenerationConfig {
                temperature: Some(DEFAULT_TEMPERATURE),
                max_output_tokens: Some(DEFAULT_MAX_TOKENS),
            }),
        };

        let body = self.generate_content(model, api_key, &request).await?;
        if let Some(usage) = &body.usage_metadata {
            rocket::debug!("Google usage: {:?}", usage);
        }

        body.into_reply().ok_or(LlmError::NoResponse)
    }

    async fn test_key(&self, api_key: &str) -> Result<(), LlmError> {
        let request = GoogleRequest {
            system_instruction: None,
            contents: vec![GoogleContent {
                role: Some("user"),
                parts: vec![GooglePart { text: "test" }],
            }],
            generation_config: Some(GoogleGenerationConfig {
                temperature: None,
                max_output_tokens: Some(1),
            }),
        };
        self.generate_content(TEST_MODEL, api_key, &request).await?;

        Ok(())
    }
}
