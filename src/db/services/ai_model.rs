use diesel::prelude::*;
use diesel::result::Error;
use diesel_async::RunQueryDsl;

use crate::db::{
    models::{AiModel, NewAiModel, UpdateAiModel},
    schema::{ai_models, api_keys},
    DbConnection,
};

pub struct AiModelDbService<'a> {
    pub db: &'a mut DbConnection,
}

impl<'a> AiModelDbService<'a> {
    pub fn new(db: &'a mut DbConnection) -> Self {
        AiModelDbService { db }
    }

    pub async fn find_all(&mut self) -> Result<Vec<AiModel>, Error> {
        ai_models::table
            .select(AiModel::as_select())
            .order(ai_models::id)
            .load(self.db)
            .await
    }

    /// Models whose referenced API key exists and is active
    pub async fn find_with_active_key(&mut self) -> Result<Vec<AiModel>, Error> {
        ai_models::table
            .filter(
                ai_models::api_key_name.eq_any(
                    api_keys::table
                        .filter(api_keys::active.eq(true))
                        .select(api_keys::name),
                ),
            )
            .select(AiModel::as_select())
            .order(ai_models::id)
            .load(self.db)
            .await
    }

    pub async fn find_by_id(&mut self, id: i32) -> Result<Option<AiModel>, Error> {
        ai_models::table
            .find(id)
            .select(AiModel::as_select())
            .first(self.db)
            .await
            .optional()
    }

    pub async fn find_by_key_and_provider(
        &mut self,
        api_key_name: &str,
        provider: &str,
    ) -> Result<Option<AiModel>, Error> {
        ai_models::table
            .filter(ai_models::api_key_name.eq(api_key_name))
            .filter(ai_models::provider.eq(provider))
            .select(AiModel::as_select())
            .first(self.db)
            .await
            .optional()
    }

    pub async fn create(&mut self, model: NewAiModel<'_>) -> Result<AiModel, Error> {
        diesel::insert_into(ai_models::table)
            .values(model)
            .returning(AiModel::as_returning())
            .get_result(self.db)
            .await
    }

    pub async fn update(&mut self, id: i32, data: UpdateAiModel<'_>) -> Result<AiModel, Error> {
        if data.is_empty() {
            return self.find_by_id(id).await?.ok_or(Error::NotFound);
        }
        diesel::update(ai_models::table.find(id))
            .set(data)
            .returning(AiModel::as_returning())
            .get_result(self.db)
            .await
    }

    pub async fn delete(&mut self, id: i32) -> Result<i32, Error> {
        diesel::delete(ai_models::table.find(id))
            .returning(ai_models::id)
            .get_result(self.db)
            .await
    }
}
