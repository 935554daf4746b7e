use serde::Serialize;

use crate::provider::{ChatMessage, ChatRole};

/// Prepend the system prompt to the transcript
pub fn build_openai_messages<'a>(
    system_prompt: &'a str,
    transcript: &'a [ChatMessage],
) -> Vec<OpenAIMessage<'a>> {
    std::iter::once(OpenAIMessage {
        role: ChatRole::System.as_str(),
        content: system_prompt,
    })
    .chain(transcript.iter().map(|message| OpenAIMessage {
        role: message.role.as_str(),
        content: &message.content,
    }))
    .collect()
}

/// OpenAI API request body
#[derive(Debug, Serialize)]
pub struct OpenAIRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// OpenAI API request message
#[derive(Debug, Serialize)]
pub struct OpenAIMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}
