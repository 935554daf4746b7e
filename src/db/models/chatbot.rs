use chrono::{DateTime, Utc};
use diesel::{
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
    Selectable,
};
use schemars::JsonSchema;
use serde::Serialize;

/// System prompt used when none is given at creation
pub const DEFAULT_SYSTEM_PROMPT: &str = "Be precise and concise.";

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, JsonSchema, Serialize)]
#[diesel(table_name = crate::db::schema::chatbot_configs)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotConfig {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    /// ID of the AI model (not the provider's model identifier)
    pub model_id: Option<i32>,
    pub system_prompt: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of an active chatbot
#[derive(Debug, Queryable, Selectable, JsonSchema, Serialize)]
#[diesel(table_name = crate::db::schema::chatbot_configs)]
pub struct PublicChatbot {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// `active: None` falls back to the column default
#[derive(Insertable)]
#[diesel(table_name = crate::db::schema::chatbot_configs)]
pub struct NewChatbotConfig<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category_id: Option<i32>,
    pub model_id: Option<i32>,
    pub system_prompt: &'a str,
    pub active: Option<bool>,
}

/// Partial update. `updated_at` is set by the database on every update.
#[derive(AsChangeset)]
#[diesel(table_name = crate::db::schema::chatbot_configs)]
pub struct UpdateChatbotConfig<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub category_id: Option<Option<i32>>,
    pub model_id: Option<Option<i32>>,
    pub system_prompt: Option<&'a str>,
    pub active: Option<bool>,
}
