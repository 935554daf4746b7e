use diesel::prelude::*;
use diesel::result::Error;
use diesel_async::RunQueryDsl;

use crate::db::{
    models::{Category, NewCategory, UpdateCategory},
    schema::categories,
    DbConnection,
};

pub struct CategoryDbService<'a> {
    pub db: &'a mut DbConnection,
}

impl<'a> CategoryDbService<'a> {
    pub fn new(db: &'a mut DbConnection) -> Self {
        CategoryDbService { db }
    }

    pub async fn find_all(&mut self) -> Result<Vec<Category>, Error> {
        categories::table
            .select(Category::as_select())
            .order(categories::id)
            .load(self.db)
            .await
    }

    pub async fn find_by_id(&mut self, id: i32) -> Result<Option<Category>, Error> {
        categories::table
            .find(id)
            .select(Category::as_select())
            .first(self.db)
            .await
            .optional()
    }

    pub async fn create(&mut self, category: NewCategory<'_>) -> Result<Category, Error> {
        diesel::insert_into(categories::table)
            .values(category)
            .returning(Category::as_returning())
            .get_result(self.db)
            .await
    }

    pub async fn update(&mut self, id: i32, data: UpdateCategory<'_>) -> Result<Category, Error> {
        if data.is_empty() {
            return self.find_by_id(id).await?.ok_or(Error::NotFound);
        }
        diesel::update(categories::table.find(id))
            .set(data)
            .returning(Category::as_returning())
            .get_result(self.db)
            .await
    }

    pub async fn delete(&mut self, id: i32) -> Result<i32, Error> {
        diesel::delete(categories::table.find(id))
            .returning(categories::id)
            .get_result(self.db)
            .await
    }
}
