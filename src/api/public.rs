use rocket::{get, post, serde::json::Json, Route, State};
use rocket_okapi::{
    okapi::openapi3::OpenApi, openapi, openapi_get_routes_spec, settings::OpenApiSettings,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::MessageResponse,
    auth::{AuthenticatedUser, IdentityService, UserRole},
    db::{models::PublicChatbot, services::ChatbotDbService, DbConnection},
    errors::ApiError,
    utils::dot_atom_local_part,
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_active_chatbots, submit_contact, check_admin]
}

/// List the active chatbots
#[openapi(tag = "Public")]
#[get("/chatbots")]
async fn get_active_chatbots(mut db: DbConnection) -> Result<Json<Vec<PublicChatbot>>, ApiError> {
    let chatbots = ChatbotDbService::new(&mut db).find_active().await?;

    Ok(Json(chatbots))
}

#[derive(JsonSchema, Deserialize, Validate)]
struct ContactInput {
    #[validate(length(min = 2, max = 100))]
    name: String,
    #[validate(email, custom(function = "dot_atom_local_part"))]
    email: String,
    #[validate(length(min = 10, max = 1000))]
    message: String,
}

/// # Contact
/// Submit the contact form
#[openapi(tag = "Public")]
#[post("/contact", data = "<input>")]
async fn submit_contact(input: Json<ContactInput>) -> Result<Json<MessageResponse>, ApiError> {
    input.validate()?;

    rocket::info!(
        "Contact form submission from {} <{}>: {}",
        input.name,
        input.email,
        input.message
    );

    Ok(Json(MessageResponse::new("Message sent successfully")))
}

#[derive(JsonSchema, Deserialize)]
struct CheckAdminInput {
    /// Must match the subject of the bearer token
    uid: String,
}

#[derive(JsonSchema, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckAdminResponse {
    message: String,
    is_admin: bool,
}

/// # Check admin
/// Report whether the signed-in user is an administrator. The bootstrap administrator
/// is granted the admin role on this call.
#[openapi(tag = "Public")]
#[post("/check-admin", data = "<input>")]
async fn check_admin(
    user: AuthenticatedUser,
    identity: &State<IdentityService>,
    input: Json<CheckAdminInput>,
) -> Result<Json<CheckAdminResponse>, ApiError> {
    if user.uid != input.uid {
        return Err(ApiError::Forbidden("Token mismatch".to_owned()));
    }

    if identity.is_bootstrap_admin(user.email.as_deref()) {
        identity.provider().set_role(&user.uid, UserRole::Admin).await?;
        rocket::info!("Admin role assigned to bootstrap administrator {}", user.uid);

        return Ok(Json(CheckAdminResponse {
            message: "Admin role assigned successfully".to_owned(),
            is_admin: true,
        }));
    }

    let record = identity.provider().get_user(&user.uid).await?;
    Ok(Json(CheckAdminResponse {
        message: "Role checked successfully".to_owned(),
        is_admin: record.role == UserRole::Admin,
    }))
}
