use chrono::{DateTime, Utc};
use diesel::{
    prelude::{Identifiable, Insertable, Queryable},
    Selectable,
};
use schemars::JsonSchema;
use serde::Serialize;

/// Knowledge-base file metadata (the encoded content is not selected)
#[derive(Debug, Identifiable, Queryable, Selectable, JsonSchema, Serialize)]
#[diesel(table_name = crate::db::schema::chatbot_files)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotFile {
    pub id: i32,
    pub chatbot_id: Option<i32>,
    pub file_name: String,
    /// MIME type
    pub file_type: String,
    /// Size in bytes
    pub file_size: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::db::schema::chatbot_files)]
pub struct NewChatbotFile<'a> {
    pub chatbot_id: Option<i32>,
    pub file_name: &'a str,
    pub file_type: &'a str,
    /// Base64-encoded file bytes
    pub file_content: &'a str,
    pub file_size: i32,
}
