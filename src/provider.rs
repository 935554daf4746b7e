//! Chat-completion providers

pub mod anthropic;
pub mod google;
pub mod openai;

use std::{collections::HashMap, sync::Arc};

use enum_iterator::Sequence;
use rocket::{async_trait, fairing::AdHoc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::provider::{
    anthropic::AnthropicProvider, google::GoogleProvider, openai::OpenAIProvider,
};

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// LLM provider-related errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("OpenAI error: {0}")]
    OpenAIError(String),
    #[error("Anthropic error: {0}")]
    AnthropicError(String),
    #[error("Google error: {0}")]
    GoogleError(String),
    #[error("No chat response")]
    NoResponse,
    #[error("Encryption error")]
    EncryptionError,
    #[error("Decryption error")]
    DecryptionError,
}

/// Known model providers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, JsonSchema, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Anthropic,
    Google,
    Deepseek,
    Qwen,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = LlmError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "openai" => Ok(ProviderKind::Openai),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "google" => Ok(ProviderKind::Google),
            "deepseek" => Ok(ProviderKind::Deepseek),
            "qwen" => Ok(ProviderKind::Qwen),
            _ => Err(LlmError::UnsupportedProvider(value.to_owned())),
        }
    }
}

impl From<&ProviderKind> for &'static str {
    fn from(value: &ProviderKind) -> Self {
        match value {
            ProviderKind::Openai => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Deepseek => "deepseek",
            ProviderKind::Qwen => "qwen",
        }
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, JsonSchema, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A message of a conversation transcript
#[derive(Debug, Clone, PartialEq, JsonSchema, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Unified API for chat-completion providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send the transcript (preceded by the system prompt) and return the top reply
    async fn send_chat(
        &self,
        model: &str,
        system_prompt: &str,
        transcript: &[ChatMessage],
        api_key: &str,
    ) -> Result<String, LlmError>;

    /// Make a minimal request to check that the provider accepts the key
    async fn test_key(&self, api_key: &str) -> Result<(), LlmError>;
}

/// Chat providers by kind. Kinds without a registered provider are unsupported.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every provider this server can talk to
    pub fn with_defaults(http_client: &reqwest::Client) -> Self {
        let mut registry = Self::new();
        registry.register(ProviderKind::Openai, OpenAIProvider::new(http_client, None));
        registry.register(ProviderKind::Anthropic, AnthropicProvider::new(http_client));
        registry.register(ProviderKind::Google, GoogleProvider::new(http_client, None));
        registry
    }

    pub fn register(&mut self, kind: ProviderKind, provider: impl ChatProvider + 'static) {
        self.providers.insert(kind, Arc::new(provider));
    }

    /// Look up the provider for the given provider name
    pub fn get(&self, provider: &str) -> Result<&dyn ChatProvider, LlmError> {
        let kind = ProviderKind::try_from(provider)?;
        self.providers
            .get(&kind)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| LlmError::UnsupportedProvider(provider.to_owned()))
    }
}

/// Fairing that sets up the shared HTTP client and the provider registry
pub fn setup_providers() -> AdHoc {
    AdHoc::on_ignite("Chat providers", |rocket| async {
        let http_client = reqwest::Client::new();
        let registry = ProviderRegistry::with_defaults(&http_client);

        rocket.manage(http_client).manage(registry)
    })
}
