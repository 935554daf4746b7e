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
        models::{Category, NewCategory, UpdateCategory},
        services::CategoryDbService,
        DbConnection,
    },
    errors::ApiError,
    utils::{deserialize_some, not_blank},
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_all_categories, create_category, update_category, delete_category]
}

/// List all categories
#[openapi(tag = "Categories")]
#[get("/")]
async fn get_all_categories(
    _admin: AdminUser,
    mut db: DbConnection,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = CategoryDbService::new(&mut db).find_all().await?;

    Ok(Json(categories))
}

#[derive(JsonSchema, Deserialize, Validate)]
struct CategoryCreateInput {
    #[validate(custom(function = "not_blank"))]
    name: String,
    description: Option<String>,
}

/// Create a new category
#[openapi(tag = "Categories")]
#[post("/", data = "<input>")]
async fn create_category(
    _admin: AdminUser,
    mut db: DbConnection,
    input: Json<CategoryCreateInput>,
) -> Result<Json<Category>, ApiError> {
    input.validate()?;

    let category = CategoryDbService::new(&mut db)
        .create(NewCategory {
            name: input.name.trim(),
            description: input.description.as_deref(),
        })
        .await?;

    Ok(Json(category))
}

#[derive(JsonSchema, Deserialize, Validate)]
struct CategoryUpdateInput {
    #[validate(custom(function = "not_blank"))]
    name: Option<String>,
    /// Set to `null` to remove the description
    #[serde(default, deserialize_with = "deserialize_some")]
    description: Option<Option<String>>,
}

/// Update a category
#[openapi(tag = "Categories")]
#[patch("/<category_id>", data = "<input>")]
async fn update_category(
    _admin: AdminUser,
    mut db: DbConnection,
    category_id: i32,
    input: Json<CategoryUpdateInput>,
) -> Result<Json<Category>, ApiError> {
    input.validate()?;

    let category = CategoryDbService::new(&mut db)
        .update(
            category_id,
            UpdateCategory {
                name: input.name.as_deref().map(str::trim),
                description: input.description.as_ref().map(|d| d.as_deref()),
            },
        )
        .await?;

    Ok(Json(category))
}

/// Delete a category. Chatbots in this category are left without one.
#[openapi(tag = "Categories")]
#[delete("/<category_id>")]
async fn delete_category(
    _admin: AdminUser,
    mut db: DbConnection,
    category_id: i32,
) -> Result<Json<MessageResponse>, ApiError> {
    CategoryDbService::new(&mut db).delete(category_id).await?;

    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
