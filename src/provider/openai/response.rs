use serde::Deserialize;

/// OpenAI API response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIResponse {
    /// Content of the first choice
    pub fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// OpenAI API response choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: Option<OpenAIResponseMessage>,
    // finish_reason: Option<String>,
}

/// OpenAI API response message
#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    // role: String,
    pub content: Option<String>,
}

/// OpenAI API response usage
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    // total_tokens: Option<u32>,
}
