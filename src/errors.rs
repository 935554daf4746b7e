use diesel::result::DatabaseErrorKind;
use rocket::{
    catch, catchers,
    response::{self, Responder},
    serde::json::Json,
    Catcher, Request,
};
use rocket_okapi::response::OpenApiResponderInner;
use schemars::JsonSchema;

use crate::{
    auth::IdentityError, provider::LlmError, registry::RegistryError, relay::RelayError,
    utils::FieldError,
};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Db(#[from] diesel::result::Error),
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Provider(#[from] LlmError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, JsonSchema, serde::Serialize)]
struct Message {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}
impl Message {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            errors: None,
        }
    }

    fn with_errors(message: &str, errors: Vec<FieldError>) -> Self {
        Self {
            message: message.to_string(),
            errors: Some(errors),
        }
    }
}

#[derive(Debug, Responder)]
enum ApiErrorResponse {
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<Message>),
    #[response(status = 401, content_type = "json")]
    Unauthorized(Json<Message>),
    #[response(status = 403, content_type = "json")]
    Forbidden(Json<Message>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<Message>),
    #[response(status = 500, content_type = "json")]
    Server(Json<Message>),
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Validation(errors) => ApiErrorResponse::BadRequest(Json(
                Message::with_errors("Validation failed", errors),
            )),
            ApiError::BadRequest(message) => {
                ApiErrorResponse::BadRequest(Json(Message::new(&message)))
            }
            ApiError::NotFound(message) => ApiErrorResponse::NotFound(Json(Message::new(&message))),
            ApiError::Forbidden(message) => {
                ApiErrorResponse::Forbidden(Json(Message::new(&message)))
            }
            ApiError::Db(error) => match error {
                diesel::result::Error::NotFound => {
                    ApiErrorResponse::NotFound(Json(Message::new("Not found!")))
                }
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    ApiErrorResponse::BadRequest(Json(Message::new("Already exists")))
                }
                diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ApiErrorResponse::BadRequest(Json(Message::new("Referenced entity not found")))
                }
                diesel::result::Error::DatabaseError(kind, _info) => ApiErrorResponse::Server(
                    Json(Message::new(&format!("Database error: {:?}", kind))),
                ),
                _ => ApiErrorResponse::Server(Json(Message::new("Server error!"))),
            },
            ApiError::Provider(error @ (LlmError::EncryptionError | LlmError::DecryptionError)) => {
                rocket::error!("Encryption error: {}", error);
                ApiErrorResponse::Server(Json(Message::new("Server error!")))
            }
            ApiError::Provider(error) => {
                ApiErrorResponse::BadRequest(Json(Message::new(&format!("Error: {}", error))))
            }
            ApiError::Registry(RegistryError::Db(error)) => ApiError::Db(error).into(),
            ApiError::Registry(RegistryError::Secret(error)) => ApiError::Provider(error).into(),
            ApiError::Relay(error) => match error {
                RelayError::ChatbotNotFound
                | RelayError::ModelNotFound
                | RelayError::CredentialNotFound => {
                    ApiErrorResponse::NotFound(Json(Message::new(&error.to_string())))
                }
                _ => ApiErrorResponse::Server(Json(Message::new("Failed to process chat request"))),
            },
            ApiError::Identity(IdentityError::UserNotFound) => {
                ApiErrorResponse::NotFound(Json(Message::new("User not found")))
            }
            ApiError::Identity(IdentityError::InvalidToken(_)) => {
                ApiErrorResponse::Unauthorized(Json(Message::new("Unauthorized")))
            }
            ApiError::Identity(_) | ApiError::Server(_) => {
                ApiErrorResponse::Server(Json(Message::new("Server error!")))
            }
        }
    }
}

/// API error response handling
impl<'r, 'o: 'r> response::Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        match &self {
            ApiError::Db(_)
            | ApiError::Identity(_)
            | ApiError::Registry(_)
            | ApiError::Relay(_)
            | ApiError::Server(_) => {
                rocket::error!("API error: {:?}", self)
            }
            _ => rocket::info!("API error: {:?}", self),
        }
        ApiErrorResponse::from(self).respond_to(req)
    }
}

/// Default JSON catchers for request errors.
pub fn get_catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        unauthorized,
        forbidden,
        unprocessable_entity,
        not_found,
        server_error
    ]
}
#[catch(400)]
fn bad_request(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::BadRequest(Json(Message::new("Bad request")))
}
#[catch(401)]
fn unauthorized(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::Unauthorized(Json(Message::new("Unauthorized!")))
}
#[catch(403)]
fn forbidden(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::Forbidden(Json(Message::new(
        "Access denied: Admin privileges required",
    )))
}
#[catch(404)]
fn not_found(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::NotFound(Json(Message::new("Not found!")))
}
#[catch(422)]
fn unprocessable_entity(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::BadRequest(Json(Message::new("Incorrectly formatted")))
}
#[catch(500)]
fn server_error(_req: &Request) -> ApiErrorResponse {
    ApiErrorResponse::Server(Json(Message::new("Server error!")))
}

/// OpenAPI specification for API error responses
impl OpenApiResponderInner for ApiError {
    fn responses(
        gen: &mut rocket_okapi::r#gen::OpenApiGenerator,
    ) -> rocket_okapi::Result<rocket_okapi::okapi::openapi3::Responses> {
        use rocket_okapi::okapi::openapi3::{
            MediaType, RefOr, Response as OpenApiResponse, Responses,
        };

        let mut responses = schemars::Map::new();
        let mut content = schemars::Map::new();
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Some(gen.json_schema::<Message>()),
                ..Default::default()
            },
        );
        let response_data = vec![
            ("400", "Bad request or validation error"),
            ("401", "Authentication error"),
            ("403", "Insufficient privileges"),
            ("404", "Not found"),
            ("422", "Incorrectly formatted"),
            ("500", "Internal error"),
        ];
        for (status, description) in response_data {
            responses.insert(
                status.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    content: content.clone(),
                    ..Default::default()
                }),
            );
        }
        Ok(Responses {
            responses,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorInformation, Error as DieselError};
    use rocket::http::Status;

    use super::*;

    struct TestInfo;

    impl DatabaseErrorInformation for TestInfo {
        fn message(&self) -> &str {
            "duplicate key"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn status_of(error: ApiError) -> Status {
        match ApiErrorResponse::from(error) {
            ApiErrorResponse::BadRequest(_) => Status::BadRequest,
            ApiErrorResponse::Unauthorized(_) => Status::Unauthorized,
            ApiErrorResponse::Forbidden(_) => Status::Forbidden,
            ApiErrorResponse::NotFound(_) => Status::NotFound,
            ApiErrorResponse::Server(_) => Status::InternalServerError,
        }
    }

    #[test]
    fn maps_error_kinds_to_statuses() {
        assert_eq!(status_of(ApiError::Validation(vec![])), Status::BadRequest);
        assert_eq!(status_of(ApiError::Db(DieselError::NotFound)), Status::NotFound);
        assert_eq!(
            status_of(ApiError::Identity(IdentityError::InvalidToken("expired".into()))),
            Status::Unauthorized
        );
        assert_eq!(status_of(ApiError::Forbidden("nope".into())), Status::Forbidden);
        assert_eq!(
            status_of(ApiError::Provider(LlmError::OpenAIError("bad key".into()))),
            Status::BadRequest
        );
        assert_eq!(
            status_of(ApiError::Provider(LlmError::DecryptionError)),
            Status::InternalServerError
        );
        assert_eq!(
            status_of(ApiError::Identity(IdentityError::Request("down".into()))),
            Status::InternalServerError
        );
    }

    #[test]
    fn unique_violation_is_bad_request() {
        let error = DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(TestInfo));
        assert_eq!(status_of(ApiError::Db(error)), Status::BadRequest);
    }

    #[test]
    fn relay_lookup_failures_are_not_found() {
        assert_eq!(status_of(RelayError::ModelNotFound.into()), Status::NotFound);
        assert_eq!(
            status_of(RelayError::Provider(LlmError::NoResponse).into()),
            Status::InternalServerError
        );
    }

    #[test]
    fn validation_errors_are_listed() {
        let response = ApiErrorResponse::from(ApiError::Validation(vec![FieldError {
            field: "email".into(),
            message: "Invalid email address".into(),
        }]));
        let ApiErrorResponse::BadRequest(Json(message)) = response else {
            panic!("expected bad request");
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({
                "message": "Validation failed",
                "errors": [{ "field": "email", "message": "Invalid email address" }]
            })
        );
    }
}
