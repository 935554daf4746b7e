use rocket::{post, serde::json::Json, Route, State};
use rocket_okapi::{
    okapi::openapi3::OpenApi, openapi, openapi_get_routes_spec, settings::OpenApiSettings,
};
use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::DbConnection,
    errors::ApiError,
    provider::{ChatMessage, ProviderRegistry},
    relay::{relay_chat, ChatCompletion, DbRelaySource, RelayError},
    utils::Encryptor,
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: send_chat]
}

#[derive(JsonSchema, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SendChatInput {
    /// The conversation so far, oldest first
    #[validate(length(min = 1, message = "Must contain at least one message"))]
    messages: Vec<ChatMessage>,
    chatbot_id: i32,
}

/// # Chat
/// Send the conversation to the chatbot's model and get its reply
#[openapi(tag = "Chat")]
#[post("/", data = "<input>")]
async fn send_chat(
    mut db: DbConnection,
    encryptor: &State<Encryptor>,
    providers: &State<ProviderRegistry>,
    input: Json<SendChatInput>,
) -> Result<Json<ChatCompletion>, ApiError> {
    input.validate()?;

    let mut source = DbRelaySource::new(&mut db, encryptor);
    match relay_chat(&mut source, providers, input.chatbot_id, &input.messages).await {
        Ok(completion) => Ok(Json(completion)),
        Err(error) => {
            if !matches!(
                error,
                RelayError::ChatbotNotFound
                    | RelayError::ModelNotFound
                    | RelayError::CredentialNotFound
            ) {
                rocket::warn!("Chat error for chatbot {}: {}", input.chatbot_id, error);
            }
            Err(error.into())
        }
    }
}
