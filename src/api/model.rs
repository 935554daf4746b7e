use rocket::{delete, get, patch, post, serde::json::Json, Route, State};
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
        models::{AiModel, NewAiModel, UpdateAiModel},
        services::AiModelDbService,
        DbConnection,
    },
    errors::ApiError,
    provider::ProviderKind,
    registry::CredentialRegistry,
    utils::{not_blank, Encryptor},
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_models, create_model, create_default_models, update_model, delete_model]
}

/// # List models
/// List the models whose API key is registered and active
#[openapi(tag = "Models")]
#[get("/")]
async fn get_models(
    _admin: AdminUser,
    mut db: DbConnection,
) -> Result<Json<Vec<AiModel>>, ApiError> {
    let models = AiModelDbService::new(&mut db).find_with_active_key().await?;

    Ok(Json(models))
}

#[derive(JsonSchema, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ModelCreateInput {
    #[validate(custom(function = "not_blank"))]
    name: String,
    provider: ProviderKind,
    /// Provider-specific model identifier
    #[validate(custom(function = "not_blank"))]
    model_id: String,
    /// Logical name of the API key
    #[validate(custom(function = "not_blank"))]
    api_key_name: String,
    active: Option<bool>,
}

/// Create a new model
#[openapi(tag = "Models")]
#[post("/", data = "<input>")]
async fn create_model(
    _admin: AdminUser,
    mut db: DbConnection,
    input: Json<ModelCreateInput>,
) -> Result<Json<AiModel>, ApiError> {
    input.validate()?;

    let model = AiModelDbService::new(&mut db)
        .create(NewAiModel {
            name: &input.name,
            provider: input.provider.as_str(),
            model_id: &input.model_id,
            api_key_name: &input.api_key_name,
            active: input.active,
        })
        .await?;

    Ok(Json(model))
}

/// # Provision default models
/// Create each provider's default model for its conventional API key name
/// (e.g. `OPENAI_API_KEY`), skipping models that already exist. Returns the created models.
#[openapi(tag = "Models")]
#[post("/defaults")]
async fn create_default_models(
    _admin: AdminUser,
    mut db: DbConnection,
    encryptor: &State<Encryptor>,
) -> Result<Json<Vec<AiModel>>, ApiError> {
    let created = CredentialRegistry::new(&mut db, encryptor)
        .provision_all_defaults()
        .await?;

    Ok(Json(created))
}

#[derive(JsonSchema, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ModelUpdateInput {
    #[validate(custom(function = "not_blank"))]
    name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    model_id: Option<String>,
    #[validate(custom(function = "not_blank"))]
    api_key_name: Option<String>,
    active: Option<bool>,
}

/// Update a model
#[openapi(tag = "Models")]
#[patch("/<model_id>", data = "<input>")]
async fn update_model(
    _admin: AdminUser,
    mut db: DbConnection,
    model_id: i32,
    input: Json<ModelUpdateInput>,
) -> Result<Json<AiModel>, ApiError> {
    input.validate()?;

    let model = AiModelDbService::new(&mut db)
        .update(
            model_id,
            UpdateAiModel {
                name: input.name.as_deref(),
                model_id: input.model_id.as_deref(),
                api_key_name: input.api_key_name.as_deref(),
                active: input.active,
            },
        )
        .await?;

    Ok(Json(model))
}

/// Delete a model. Chatbots using it are left without a model.
#[openapi(tag = "Models")]
#[delete("/<model_id>")]
async fn delete_model(
    _admin: AdminUser,
    mut db: DbConnection,
    model_id: i32,
) -> Result<Json<MessageResponse>, ApiError> {
    AiModelDbService::new(&mut db).delete(model_id).await?;

    Ok(Json(MessageResponse::new("AI model deleted successfully")))
}
