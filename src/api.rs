mod api_key;
mod category;
mod chat;
mod chatbot;
mod file;
mod member;
mod model;
mod public;

pub use api_key::get_routes as api_key_routes;
pub use category::get_routes as category_routes;
pub use chat::get_routes as chat_routes;
pub use chatbot::get_routes as chatbot_routes;
pub use file::{get_routes as file_routes, get_undocumented_routes as file_upload_routes};
pub use member::get_routes as member_routes;
pub use model::get_routes as model_routes;
pub use public::get_routes as public_routes;

use schemars::JsonSchema;
use serde::Serialize;

/// Plain confirmation message
#[derive(Debug, JsonSchema, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}
