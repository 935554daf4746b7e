use diesel::{dsl::now, prelude::*};
use diesel::result::Error;
use diesel_async::RunQueryDsl;

use crate::db::{
    models::{ChatbotFile, NewChatbotFile},
    schema::chatbot_files,
    DbConnection,
};

pub struct FileDbService<'a> {
    pub db: &'a mut DbConnection,
}

impl<'a> FileDbService<'a> {
    pub fn new(db: &'a mut DbConnection) -> Self {
        FileDbService { db }
    }

    pub async fn find_all(&mut self) -> Result<Vec<ChatbotFile>, Error> {
        chatbot_files::table
            .select(ChatbotFile::as_select())
            .order(chatbot_files::id)
            .load(self.db)
            .await
    }

    pub async fn create(&mut self, file: NewChatbotFile<'_>) -> Result<ChatbotFile, Error> {
        diesel::insert_into(chatbot_files::table)
            .values(file)
            .returning(ChatbotFile::as_returning())
            .get_result(self.db)
            .await
    }

    /// Point the given files at a chatbot. Unknown IDs are skipped; returns the updated files.
    pub async fn associate(
        &mut self,
        file_ids: &[i32],
        chatbot_id: i32,
    ) -> Result<Vec<ChatbotFile>, Error> {
        diesel::update(chatbot_files::table.filter(chatbot_files::id.eq_any(file_ids)))
            .set((
                chatbot_files::chatbot_id.eq(chatbot_id),
                chatbot_files::updated_at.eq(now),
            ))
            .returning(ChatbotFile::as_returning())
            .get_results(self.db)
            .await
    }

    pub async fn delete_many(&mut self, file_ids: &[i32]) -> Result<Vec<i32>, Error> {
        diesel::delete(chatbot_files::table.filter(chatbot_files::id.eq_any(file_ids)))
            .returning(chatbot_files::id)
            .get_results(self.db)
            .await
    }
}
