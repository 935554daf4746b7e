use diesel::{dsl::now, prelude::*};
use diesel::result::Error;
use diesel_async::RunQueryDsl;

use crate::db::{
    models::{ChatbotConfig, NewChatbotConfig, PublicChatbot, UpdateChatbotConfig},
    schema::chatbot_configs,
    DbConnection,
};

pub struct ChatbotDbService<'a> {
    pub db: &'a mut DbConnection,
}

impl<'a> ChatbotDbService<'a> {
    pub fn new(db: &'a mut DbConnection) -> Self {
        ChatbotDbService { db }
    }

    pub async fn find_all(&mut self) -> Result<Vec<ChatbotConfig>, Error> {
        chatbot_configs::table
            .select(ChatbotConfig::as_select())
            .order(chatbot_configs::id)
            .load(self.db)
            .await
    }

    pub async fn find_active(&mut self) -> Result<Vec<PublicChatbot>, Error> {
        chatbot_configs::table
            .filter(chatbot_configs::active.eq(true))
            .select(PublicChatbot::as_select())
            .order(chatbot_configs::id)
            .load(self.db)
            .await
    }

    pub async fn find_by_id(&mut self, id: i32) -> Result<Option<ChatbotConfig>, Error> {
        chatbot_configs::table
            .find(id)
            .select(ChatbotConfig::as_select())
            .first(self.db)
            .await
            .optional()
    }

    pub async fn create(&mut self, chatbot: NewChatbotConfig<'_>) -> Result<ChatbotConfig, Error> {
        diesel::insert_into(chatbot_configs::table)
            .values(chatbot)
            .returning(ChatbotConfig::as_returning())
            .get_result(self.db)
            .await
    }

    /// Apply a partial update and bump `updated_at` with the database clock
    pub async fn update(
        &mut self,
        id: i32,
        data: UpdateChatbotConfig<'_>,
    ) -> Result<ChatbotConfig, Error> {
        diesel::update(chatbot_configs::table.find(id))
            .set((data, chatbot_configs::updated_at.eq(now)))
            .returning(ChatbotConfig::as_returning())
            .get_result(self.db)
            .await
    }

    pub async fn delete(&mut self, id: i32) -> Result<i32, Error> {
        diesel::delete(chatbot_configs::table.find(id))
            .returning(chatbot_configs::id)
            .get_result(self.db)
            .await
    }
}
