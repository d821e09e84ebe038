//! Repository layer for catalog storage
//!
//! Lookups return `AppResult<Option<T>>`: `Err` is a store fault, `Ok(None)`
//! means the record does not exist. Every write validates its record first.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, NewAuthor},
        book::{Book, BookChanges, BookFilter, BookTitle, NewBook},
        book_instance::{BookInstance, NewBookInstance},
        user::User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    /// Authors owned by `owner`, optionally filtered by a case-insensitive name substring
    async fn list(&self, owner: Uuid, name: Option<String>) -> AppResult<Vec<Author>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Author>>;
    async fn create(&self, data: &NewAuthor) -> AppResult<Author>;
    async fn update(&self, id: Uuid, data: &NewAuthor) -> AppResult<Option<Author>>;
    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn list(&self, owner: Uuid, filter: &BookFilter) -> AppResult<Vec<Book>>;
    /// Most recently created books, newest first
    async fn recent(&self, limit: i64) -> AppResult<Vec<Book>>;
    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> AppResult<Vec<Book>>;
    async fn count_by_author(&self, author_id: Uuid) -> AppResult<i64>;
    async fn titles(&self) -> AppResult<Vec<BookTitle>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;
    async fn create(&self, data: &NewBook) -> AppResult<Book>;
    async fn update(&self, id: Uuid, data: &BookChanges) -> AppResult<Option<Book>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstancesRepository: Send + Sync {
    /// All copies with their book title joined
    async fn list(&self) -> AppResult<Vec<BookInstance>>;
    async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>>;
    async fn count_by_book(&self, book_id: Uuid) -> AppResult<i64>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookInstance>>;
    async fn create(&self, data: &NewBookInstance) -> AppResult<BookInstance>;
    async fn update(&self, id: Uuid, data: &NewBookInstance) -> AppResult<Option<BookInstance>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Fails with a conflict when the username is taken
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User>;
}

/// Main repository struct holding one store per record type
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorsRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub book_instances: Arc<dyn BookInstancesRepository>,
    pub users: Arc<dyn UsersRepository>,
    pool: Option<Pool<Postgres>>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool.clone()));
        Self {
            authors: store.clone(),
            books: store.clone(),
            book_instances: store.clone(),
            users: store,
            pool: Some(pool),
        }
    }

    /// Create a repository backed by an in-process store
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            authors: store.clone(),
            books: store.clone(),
            book_instances: store.clone(),
            users: store,
            pool: None,
        }
    }

    /// Assemble a repository from individual stores
    pub fn from_parts(
        authors: Arc<dyn AuthorsRepository>,
        books: Arc<dyn BooksRepository>,
        book_instances: Arc<dyn BookInstancesRepository>,
        users: Arc<dyn UsersRepository>,
    ) -> Self {
        Self {
            authors,
            books,
            book_instances,
            users,
            pool: None,
        }
    }

    /// Check store connectivity
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
