use chrono::{DateTime, Utc};
use diesel::{
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
    Selectable,
};
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Identifiable, Queryable, Selectable, JsonSchema, Serialize)]
#[diesel(table_name = crate::db::schema::categories)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::db::schema::categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Default, AsChangeset)]
#[diesel(table_name = crate::db::schema::categories)]
pub struct UpdateCategory<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
}

impl UpdateCategory<'_> {
    /// Whether the patch would leave the row untouched
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
