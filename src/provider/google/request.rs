use serde::Serialize;

use crate::provider::{ChatMessage, ChatRole};

/// Map the transcript to Gemini contents. Gemini calls the assistant `model`, and takes
/// system messages only as the separate system instruction, so they are dropped here.
pub fn build_google_contents(transcript: &[ChatMessage]) -> Vec<GoogleContent<'_>> {
    transcript
        .iter()
        .filter_map(|message| {
            let role = match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
                ChatRole::System => return None,
            };
            Some(GoogleContent {
                role: Some(role),
                parts: vec![GooglePart {
                    text: &message.content,
                }],
            })
        })
        .collect()
}

/// Gemini `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleContent<'a>>,
    pub contents: Vec<GoogleContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GoogleGenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct GoogleContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    pub parts: Vec<GooglePart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GooglePart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}
