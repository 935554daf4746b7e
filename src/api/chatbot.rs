use rocket::{delete, get, patch, post, serde::json::Json, Route};
use rocket_okapi::{
    okapi::openapi3::OpenApi, openapi, openapi_get_routes_spec, settings::OpenApiSettings,
};
use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::MessageResponse,
    auth::AdminUser,
    db::{
        models::{ChatbotConfig, NewChatbotConfig, UpdateChatbotConfig, DEFAULT_SYSTEM_PROMPT},
        services::{ChatbotDbService, FileDbService},
        DbConnection,
    },
    errors::ApiError,
    utils::{deserialize_some, not_blank},
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_all_chatbots, create_chatbot, update_chatbot, delete_chatbot]
}

/// List all chatbots, including inactive ones
#[openapi(tag = "Chatbots")]
#[get("/")]
async fn get_all_chatbots(
    _admin: AdminUser,
    mut db: DbConnection,
) -> Result<Json<Vec<ChatbotConfig>>, ApiError> {
    let chatbots = ChatbotDbService::new(&mut db).find_all().await?;

    Ok(Json(chatbots))
}

#[derive(JsonSchema, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ChatbotCreateInput {
    #[validate(custom(function = "not_blank"))]
    name: String,
    description: Option<String>,
    category_id: Option<i32>,
    /// ID of the AI model
    model_id: Option<i32>,
    /// Defaults to "Be precise and concise."
    #[validate(custom(function = "not_blank"))]
    system_prompt: Option<String>,
    active: Option<bool>,
    /// Uploaded files to attach to the chatbot. Unknown IDs are ignored.
    #[serde(default)]
    file_ids: Vec<i32>,
}

/// # Create chatbot
/// Create a new chatbot and attach the given files to it
#[openapi(tag = "Chatbots")]
#[post("/", data = "<input>")]
async fn create_chatbot(
    _admin: AdminUser,
    mut db: DbConnection,
    input: Json<ChatbotCreateInput>,
) -> Result<Json<ChatbotConfig>, ApiError> {
    input.validate()?;

    let chatbot = ChatbotDbService::new(&mut db)
        .create(NewChatbotConfig {
            name: input.name.trim(),
            description: input.description.as_deref(),
            category_id: input.category_id,
            model_id: input.model_id,
            system_prompt: input.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT),
            active: input.active,
        })
        .await?;
    attach_files(&mut db, &input.file_ids, chatbot.id).await?;

    Ok(Json(chatbot))
}

#[derive(JsonSchema, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ChatbotUpdateInput {
    #[validate(custom(function = "not_blank"))]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    description: Option<Option<String>>,
    /// Set to `null` to remove the category
    #[serde(default, deserialize_with = "deserialize_some")]
    category_id: Option<Option<i32>>,
    /// Set to `null` to remove the model
    #[serde(default, deserialize_with = "deserialize_some")]
    model_id: Option<Option<i32>>,
    #[validate(custom(function = "not_blank"))]
    system_prompt: Option<String>,
    active: Option<bool>,
    /// Uploaded files to attach to the chatbot. Unknown IDs are ignored.
    #[serde(default)]
    file_ids: Vec<i32>,
}

/// # Update chatbot
/// Update the given fields of a chatbot. Omitted fields are left unchanged.
#[openapi(tag = "Chatbots")]
#[patch("/<chatbot_id>", data = "<input>")]
async fn update_chatbot(
    _admin: AdminUser,
    mut db: DbConnection,
    chatbot_id: i32,
    input: Json<ChatbotUpdateInput>,
) -> Result<Json<ChatbotConfig>, ApiError> {
    input.validate()?;

    let chatbot = ChatbotDbService::new(&mut db)
        .update(
            chatbot_id,
            UpdateChatbotConfig {
                name: input.name.as_deref().map(str::trim),
                description: input.description.as_ref().map(|d| d.as_deref()),
                category_id: input.category_id,
                model_id: input.model_id,
                system_prompt: input.system_prompt.as_deref(),
                active: input.active,
            },
        )
        .await?;
    attach_files(&mut db, &input.file_ids, chatbot.id).await?;

    Ok(Json(chatbot))
}

/// Delete a chatbot. Its files are kept, without a chatbot.
#[openapi(tag = "Chatbots")]
#[delete("/<chatbot_id>")]
async fn delete_chatbot(
    _admin: AdminUser,
    mut db: DbConnection,
    chatbot_id: i32,
) -> Result<Json<MessageResponse>, ApiError> {
    ChatbotDbService::new(&mut db).delete(chatbot_id).await?;

    Ok(Json(MessageResponse::new("Chatbot deleted successfully")))
}

async fn attach_files(
    db: &mut DbConnection,
    file_ids: &[i32],
    chatbot_id: i32,
) -> Result<(), ApiError> {
    if file_ids.is_empty() {
        return Ok(());
    }
    let attached = FileDbService::new(db).associate(file_ids, chatbot_id).await?;
    if attached.len() < file_ids.len() {
        rocket::info!(
            "Chatbot {}: attached {} of {} files",
            chatbot_id,
            attached.len(),
            file_ids.len()
        );
    }

    Ok(())
}
