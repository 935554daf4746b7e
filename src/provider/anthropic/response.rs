use serde::Deserialize;

/// Anthropic API response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContentBlock>,
    pub usage: Option<AnthropicUsage>,
}

impl AnthropicResponse {
    /// Text of the first text block
    pub fn into_reply(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text),
            AnthropicContentBlock::Other => None,
        })
    }
}

/// Anthropic API response content block
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Anthropic API response usage
#[derive(Debug, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// Anthropic API error body
#[derive(Debug, Deserialize)]
pub struct AnthropicErrorResponse {
    pub error: AnthropicError,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicError {
    // #[serde(rename = "type")]
    // error_type: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_text_block() {
        let response: AnthropicResponse = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                    {"type": "text", "text": "Hello!"}
                ],
                "usage": {"input_tokens": 10, "output_tokens": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(response.into_reply().as_deref(), Some("Hello!"));
    }

    #[test]
    fn parses_error_body() {
        let body: AnthropicErrorResponse = serde_json::from_str(
            r#"{"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.message, "invalid x-api-key");
    }
}
