use serde::Serialize;

use crate::provider::{ChatMessage, ChatRole};

/// Convert the transcript to Anthropic messages. System messages are dropped, since
/// Anthropic takes the system prompt as a separate field.
pub fn build_anthropic_messages(transcript: &[ChatMessage]) -> Vec<AnthropicMessage<'_>> {
    transcript
        .iter()
        .filter_map(|message| {
            let role = match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
                ChatRole::System => return None,
            };
            Some(AnthropicMessage {
                role,
                content: &message.content,
            })
        })
        .collect()
}

/// Anthropic API request body
#[derive(Debug, Serialize)]
pub struct AnthropicRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<AnthropicMessage<'a>>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
}

/// Anthropic API message
#[derive(Debug, Serialize)]
pub struct AnthropicMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}
