//! Chat relay: resolves a chatbot's model and credential, then forwards the conversation
//! to the model's provider.

use diesel::result::Error as DbError;
use rocket::async_trait;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    db::{
        models::{AiModel, ChatbotConfig},
        services::{AiModelDbService, ChatbotDbService},
        DbConnection,
    },
    provider::{ChatMessage, LlmError, ProviderRegistry},
    registry::{CredentialRegistry, RegistryError},
    utils::Encryptor,
};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Chatbot not found")]
    ChatbotNotFound,
    #[error("AI model not found")]
    ModelNotFound,
    #[error("API key not found")]
    CredentialNotFound,
    #[error(transparent)]
    Provider(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] DbError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Where the relay looks up chatbots, models and secrets
#[async_trait]
pub trait RelaySource: Send {
    async fn chatbot(&mut self, id: i32) -> Result<Option<ChatbotConfig>, RelayError>;
    async fn model(&mut self, id: i32) -> Result<Option<AiModel>, RelayError>;
    /// Secret of the active key with this logical name
    async fn credential(&mut self, name: &str) -> Result<Option<String>, RelayError>;
}

/// Relay source backed by the database
pub struct DbRelaySource<'a> {
    db: &'a mut DbConnection,
    encryptor: &'a Encryptor,
}

impl<'a> DbRelaySource<'a> {
    pub fn new(db: &'a mut DbConnection, encryptor: &'a Encryptor) -> Self {
        Self { db, encryptor }
    }
}

#[async_trait]
impl RelaySource for DbRelaySource<'_> {
    async fn chatbot(&mut self, id: i32) -> Result<Option<ChatbotConfig>, RelayError> {
        Ok(ChatbotDbService::new(self.db).find_by_id(id).await?)
    }

    async fn model(&mut self, id: i32) -> Result<Option<AiModel>, RelayError> {
        Ok(AiModelDbService::new(self.db).find_by_id(id).await?)
    }

    async fn credential(&mut self, name: &str) -> Result<Option<String>, RelayError> {
        Ok(CredentialRegistry::new(self.db, self.encryptor)
            .resolve(name)
            .await?)
    }
}

/// Reply in the chat-completion response shape
#[derive(Debug, JsonSchema, Serialize)]
pub struct ChatCompletion {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct ChatReply {
    pub content: String,
}

impl From<String> for ChatCompletion {
    fn from(content: String) -> Self {
        ChatCompletion {
            choices: vec![ChatChoice {
                message: ChatReply { content },
            }],
        }
    }
}

/// Send the transcript to the chatbot's model and return the provider's reply.
/// Inactive chatbots and models are treated as missing.
pub async fn relay_chat(
    source: &mut impl RelaySource,
    providers: &ProviderRegistry,
    chatbot_id: i32,
    transcript: &[ChatMessage],
) -> Result<ChatCompletion, RelayError> {
    let chatbot = source
        .chatbot(chatbot_id)
        .await?
        .filter(|chatbot| chatbot.active)
        .ok_or(RelayError::ChatbotNotFound)?;

    let Some(model_id) = chatbot.model_id else {
        return Err(RelayError::ModelNotFound);
    };
    let model = source
        .model(model_id)
        .await?
        .filter(|model| model.active)
        .ok_or(RelayError::ModelNotFound)?;

    let api_key = source
        .credential(&model.api_key_name)
        .await?
        .ok_or(RelayError::CredentialNotFound)?;

    let provider = providers.get(&model.provider)?;
    rocket::debug!(
        "Relaying chat for chatbot {} to {} ({})",
        chatbot.id,
        model.provider,
        model.model_id
    );
    let reply = provider
        .send_chat(&model.model_id, &chatbot.system_prompt, transcript, &api_key)
        .await?;

    Ok(reply.into())
}
