use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
};
use rocket_okapi::{
    gen::OpenApiGenerator,
    okapi::openapi3,
    request::{OpenApiFromRequest, RequestHeaderInput},
};

use crate::auth::{IdentityError, IdentityService, UserRole};

const BEARER_PREFIX: &str = "Bearer ";

/// Request guard to ensure a valid bearer token. Doesn't check the user's role.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: Option<String>,
}

/// Request guard to ensure a user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = &'r str;

    async fn from_request(req: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(identity) = req.rocket().state::<IdentityService>() else {
            rocket::error!("Auth guard: identity provider not configured");
            return Outcome::Error((Status::InternalServerError, "Server error"));
        };

        let Some(token) = req
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
        else {
            return Outcome::Error((Status::Unauthorized, "Unauthorized"));
        };

        match identity.provider().verify_token(token).await {
            Ok(verified) => Outcome::Success(AuthenticatedUser {
                uid: verified.uid,
                email: verified.email,
            }),
            Err(IdentityError::InvalidToken(e)) => {
                rocket::debug!("Auth guard: invalid token: {}", e);
                Outcome::Error((Status::Unauthorized, "Invalid token"))
            }
            Err(e) => {
                rocket::error!("Auth guard: identity provider error: {}", e);
                Outcome::Error((Status::InternalServerError, "Server error"))
            }
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = &'r str;

    async fn from_request(req: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        let user = try_outcome!(req.guard::<AuthenticatedUser>().await);
        let Some(identity) = req.rocket().state::<IdentityService>() else {
            return Outcome::Error((Status::InternalServerError, "Server error"));
        };

        match identity.provider().get_user(&user.uid).await {
            Ok(record) if record.role == UserRole::Admin => Outcome::Success(AdminUser(user)),
            Ok(_) | Err(IdentityError::UserNotFound) => Outcome::Error((
                Status::Forbidden,
                "Access denied: Admin privileges required",
            )),
            Err(e) => {
                rocket::error!("Admin guard: identity provider error: {}", e);
                Outcome::Error((Status::InternalServerError, "Server error"))
            }
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AuthenticatedUser {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        bearer_token_docs("Requires a valid ID token.")
    }
}

impl<'a> OpenApiFromRequest<'a> for AdminUser {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        bearer_token_docs("Requires an ID token of a user with the admin role.")
    }
}

fn bearer_token_docs(description: &str) -> Result<RequestHeaderInput, rocket_okapi::OpenApiError> {
    let security_scheme = openapi3::SecurityScheme {
        description: Some(description.to_owned()),
        data: openapi3::SecuritySchemeData::Http {
            scheme: "bearer".to_owned(),
            bearer_format: Some("JWT".to_owned()),
        },
        extensions: openapi3::Object::default(),
    };
    let mut security_req = openapi3::SecurityRequirement::new();
    security_req.insert("ID Token".to_owned(), Vec::new());
    Ok(RequestHeaderInput::Security(
        "ID Token".to_owned(),
        security_scheme,
        security_req,
    ))
}
