use rocket::{delete, get, post, serde::json::Json, Route, State};
use rocket_okapi::{
    okapi::openapi3::OpenApi, openapi, openapi_get_routes_spec, settings::OpenApiSettings,
};
use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::MessageResponse,
    auth::AdminUser,
    db::{models::ApiKey, services::ApiKeyDbService, DbConnection},
    errors::ApiError,
    provider::{ProviderKind, ProviderRegistry},
    registry::CredentialRegistry,
    utils::{not_blank, Encryptor},
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_all_api_keys, save_api_key, delete_api_key, test_api_key]
}

/// List all API keys (without their secrets)
#[openapi(tag = "API Keys")]
#[get("/")]
async fn get_all_api_keys(
    _admin: AdminUser,
    mut db: DbConnection,
) -> Result<Json<Vec<ApiKey>>, ApiError> {
    let keys = ApiKeyDbService::new(&mut db).find_all().await?;

    Ok(Json(keys))
}

#[derive(JsonSchema, Deserialize, Validate)]
struct ApiKeySaveInput {
    /// Logical name, e.g. `OPENAI_API_KEY`
    #[validate(custom(function = "not_blank"))]
    name: String,
    provider: ProviderKind,
    /// The secret key
    #[validate(custom(function = "not_blank"))]
    value: String,
}

/// # Save API key
/// Create an API key, or replace the key with the same name. If the provider has a
/// default model and no model uses this key yet, the default model is created.
#[openapi(tag = "API Keys")]
#[post("/", data = "<input>")]
async fn save_api_key(
    _admin: AdminUser,
    mut db: DbConnection,
    encryptor: &State<Encryptor>,
    input: Json<ApiKeySaveInput>,
) -> Result<Json<ApiKey>, ApiError> {
    input.validate()?;

    let name = input.name.trim();
    let mut registry = CredentialRegistry::new(&mut db, encryptor);
    let key = registry.upsert(name, input.provider, input.value.trim()).await?;
    registry.provision_default_model(name, input.provider).await?;

    Ok(Json(key))
}

/// Delete an API key
#[openapi(tag = "API Keys")]
#[delete("/<api_key_id>")]
async fn delete_api_key(
    _admin: AdminUser,
    mut db: DbConnection,
    api_key_id: i32,
) -> Result<Json<MessageResponse>, ApiError> {
    ApiKeyDbService::new(&mut db).delete(api_key_id).await?;

    Ok(Json(MessageResponse::new("API key deleted successfully")))
}

#[derive(JsonSchema, Deserialize)]
struct ApiKeyTestInput {
    provider: String,
    value: String,
}

/// # Test API key
/// Make a minimal request to the provider with the given key
#[openapi(tag = "API Keys")]
#[post("/test", data = "<input>")]
async fn test_api_key(
    _admin: AdminUser,
    providers: &State<ProviderRegistry>,
    input: Json<ApiKeyTestInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let result = match providers.get(&input.provider) {
        Ok(provider) => provider.test_key(input.value.trim()).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        rocket::info!("API key test failed for {}: {}", input.provider, e);
        return Err(ApiError::BadRequest(format!(
            "Failed to validate API key: {}",
            e
        )));
    }

    Ok(Json(MessageResponse::new("API key validated successfully")))
}
