use serde::Deserialize;

/// Gemini `generateContent` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponse {
    #[serde(default)]
    pub candidates: Vec<GoogleCandidate>,
    pub usage_metadata: Option<GoogleUsage>,
}

impl GoogleResponse {
    /// Text parts of the first candidate, joined
    pub fn into_reply(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|part| part.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
pub struct GoogleCandidate {
    pub content: Option<GoogleResponseContent>,
    // finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleResponseContent {
    #[serde(default)]
    pub parts: Vec<GoogleResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUsage {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_parts_of_first_candidate() {
        let response: GoogleResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"role": "model", "parts": [{"text": "Hi "}, {"text": "there"}]}, "finishReason": "STOP"},
                    {"content": {"role": "model", "parts": [{"text": "Other"}]}}
                ],
                "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
            }"#,
        )
        .unwrap();

        assert_eq!(response.into_reply().as_deref(), Some("Hi there"));
    }

    #[test]
    fn blocked_prompt_has_no_reply() {
        let response: GoogleResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(response.into_reply(), None);
    }
}
