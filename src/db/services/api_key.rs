use diesel::{dsl::now, prelude::*, upsert::excluded};
use diesel::result::Error;
use diesel_async::RunQueryDsl;

use crate::db::{
    models::{ApiKey, ApiKeySecret, NewApiKey},
    schema::api_keys,
    DbConnection,
};

pub struct ApiKeyDbService<'a> {
    pub db: &'a mut DbConnection,
}

impl<'a> ApiKeyDbService<'a> {
    pub fn new(db: &'a mut DbConnection) -> Self {
        ApiKeyDbService { db }
    }

    pub async fn find_all(&mut self) -> Result<Vec<ApiKey>, Error> {
        api_keys::table
            .select(ApiKey::as_select())
            .order(api_keys::id)
            .load(self.db)
            .await
    }

    pub async fn find_secret_by_name(&mut self, name: &str) -> Result<Option<ApiKeySecret>, Error> {
        api_keys::table
            .filter(api_keys::name.eq(name))
            .select(ApiKeySecret::as_select())
            .first(self.db)
            .await
            .optional()
    }

    /// Insert the key, or overwrite the key with the same name in place (same ID)
    pub async fn upsert(&mut self, api_key: NewApiKey<'_>) -> Result<ApiKey, Error> {
        diesel::insert_into(api_keys::table)
            .values(api_key)
            .on_conflict(api_keys::name)
            .do_update()
            .set((
                api_keys::provider.eq(excluded(api_keys::provider)),
                api_keys::ciphertext.eq(excluded(api_keys::ciphertext)),
                api_keys::nonce.eq(excluded(api_keys::nonce)),
                api_keys::active.eq(excluded(api_keys::active)),
                api_keys::last_tested.eq(excluded(api_keys::last_tested)),
                api_keys::updated_at.eq(now),
            ))
            .returning(ApiKey::as_returning())
            .get_result(self.db)
            .await
    }

    pub async fn delete(&mut self, id: i32) -> Result<i32, Error> {
        diesel::delete(api_keys::table.find(id))
            .returning(api_keys::id)
            .get_result(self.db)
            .await
    }
}
