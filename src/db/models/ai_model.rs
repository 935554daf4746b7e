use chrono::{DateTime, Utc};
use diesel::{
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
    Selectable,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::provider::ProviderKind;

/// A model offered by a provider, bound to a credential by its logical name
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, JsonSchema, Serialize)]
#[diesel(table_name = crate::db::schema::ai_models)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: i32,
    pub name: String,
    #[schemars(with = "ProviderKind")]
    pub provider: String,
    /// Provider-specific model identifier, e.g. `gpt-4o`
    pub model_id: String,
    /// Logical name of the API key used to call the provider
    pub api_key_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::db::schema::ai_models)]
pub struct NewAiModel<'a> {
    pub name: &'a str,
    pub provider: &'a str,
    pub model_id: &'a str,
    pub api_key_name: &'a str,
    pub active: Option<bool>,
}

#[derive(Default, AsChangeset)]
#[diesel(table_name = crate::db::schema::ai_models)]
pub struct UpdateAiModel<'a> {
    pub name: Option<&'a str>,
    pub model_id: Option<&'a str>,
    pub api_key_name: Option<&'a str>,
    pub active: Option<bool>,
}

impl UpdateAiModel<'_> {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.model_id.is_none()
            && self.api_key_name.is_none()
            && self.active.is_none()
    }
}
