use rocket::{get, patch, serde::json::Json, Route, State};
use rocket_okapi::{
    okapi::openapi3::OpenApi, openapi, openapi_get_routes_spec, settings::OpenApiSettings,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::{AdminUser, IdentityService, IdentityUser, UserRole},
    errors::ApiError,
    utils::not_blank,
};

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_members, update_member_role]
}

/// List all users with their roles
#[openapi(tag = "Members")]
#[get("/")]
async fn get_members(
    _admin: AdminUser,
    identity: &State<IdentityService>,
) -> Result<Json<Vec<IdentityUser>>, ApiError> {
    let members = identity.provider().list_users().await?;

    Ok(Json(members))
}

#[derive(JsonSchema, Deserialize, Validate)]
struct RoleUpdateInput {
    #[validate(custom(function = "not_blank"))]
    uid: String,
    role: UserRole,
}

#[derive(JsonSchema, Serialize)]
struct RoleUpdateResponse {
    message: String,
    role: UserRole,
}

/// # Update role
/// Set a user's role. The bootstrap administrator can't be demoted.
#[openapi(tag = "Members")]
#[patch("/role", data = "<input>")]
async fn update_member_role(
    admin: AdminUser,
    identity: &State<IdentityService>,
    input: Json<RoleUpdateInput>,
) -> Result<Json<RoleUpdateResponse>, ApiError> {
    input.validate()?;

    let user = identity.provider().get_user(&input.uid).await?;
    if input.role != UserRole::Admin && identity.is_bootstrap_admin(user.email.as_deref()) {
        return Err(ApiError::Forbidden(
            "Cannot change the role of the primary administrator".to_owned(),
        ));
    }

    identity.provider().set_role(&user.uid, input.role).await?;
    rocket::info!(
        "Role of {} set to {:?} by {}",
        user.uid,
        input.role,
        admin.0.uid
    );

    Ok(Json(RoleUpdateResponse {
        message: "Role updated successfully".to_owned(),
        role: input.role,
    }))
}
