use chrono::{DateTime, Utc};
use diesel::{
    prelude::{Identifiable, Insertable, Queryable},
    Selectable,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::provider::ProviderKind;

/// API key metadata. The secret columns are never selected into this struct.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, JsonSchema, Serialize)]
#[diesel(table_name = crate::db::schema::api_keys)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: i32,
    /// Logical name, e.g. `OPENAI_API_KEY`
    pub name: String,
    #[schemars(with = "ProviderKind")]
    pub provider: String,
    pub active: bool,
    pub last_tested: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API key including the encrypted secret
#[derive(Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::db::schema::api_keys)]
pub struct ApiKeySecret {
    pub id: i32,
    pub name: String,
    pub provider: String,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub active: bool,
}

/// Values written on insert, and on conflict with an existing name
#[derive(Insertable)]
#[diesel(table_name = crate::db::schema::api_keys)]
pub struct NewApiKey<'a> {
    pub name: &'a str,
    pub provider: &'a str,
    pub ciphertext: &'a Vec<u8>,
    pub nonce: &'a Vec<u8>,
    pub active: bool,
    pub last_tested: Option<DateTime<Utc>>,
}
