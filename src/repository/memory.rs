//! In-process store, for development and tests
//!
//! Applies the same record validation and referential rules as the
//! PostgreSQL schema.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use super::{AuthorsRepository, BookInstancesRepository, BooksRepository, UsersRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, NewAuthor},
        book::{Book, BookChanges, BookFilter, BookTitle, NewBook},
        book_instance::{BookInstance, NewBookInstance},
        user::User,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    authors: RwLock<HashMap<Uuid, Author>>,
    books: RwLock<HashMap<Uuid, Book>>,
    book_instances: RwLock<HashMap<Uuid, BookInstance>>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryStore {
    async fn with_author_name(&self, mut book: Book) -> Book {
        book.author_name = self
            .authors
            .read()
            .await
            .get(&book.author_id)
            .map(|a| a.name.clone());
        book
    }

    async fn with_book_title(&self, mut instance: BookInstance) -> BookInstance {
        instance.book_title = self
            .books
            .read()
            .await
            .get(&instance.book_id)
            .map(|b| b.title.clone());
        instance
    }

    async fn require_author(&self, id: Uuid) -> AppResult<()> {
        if self.authors.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::Conflict("Book references a missing author".to_string()))
        }
    }

    async fn require_book(&self, id: Uuid) -> AppResult<()> {
        if self.books.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::Conflict("Book copy references a missing book".to_string()))
        }
    }
}

#[async_trait]
impl AuthorsRepository for MemoryStore {
    async fn list(&self, owner: Uuid, name: Option<String>) -> AppResult<Vec<Author>> {
        let mut rows: Vec<Author> = self
            .authors
            .read()
            .await
            .values()
            .filter(|a| a.user_id == owner)
            .filter(|a| name.as_deref().map_or(true, |n| contains_ignore_case(&a.name, n)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.authors.read().await.get(&id).cloned())
    }

    async fn create(&self, data: &NewAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = Author {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        self.authors.write().await.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: Uuid, data: &NewAuthor) -> AppResult<Option<Author>> {
        data.validate()?;
        let mut authors = self.authors.write().await;
        Ok(authors.get_mut(&id).map(|author| {
            author.name = data.name.clone();
            author.user_id = data.user_id;
            author.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        if self.books.read().await.values().any(|b| b.author_id == id) {
            return Err(AppError::Conflict("Author still has books".to_string()));
        }
        Ok(self.authors.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn list(&self, owner: Uuid, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut rows: Vec<Book> = self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.user_id == owner)
            .filter(|b| filter.title.as_deref().map_or(true, |t| contains_ignore_case(&b.title, t)))
            .filter(|b| filter.published_after.map_or(true, |d| b.publish_date >= d))
            .filter(|b| filter.published_before.map_or(true, |d| b.publish_date <= d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));

        let mut joined = Vec::with_capacity(rows.len());
        for book in rows {
            joined.push(self.with_author_name(book).await);
        }
        Ok(joined)
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<Book>> {
        let mut rows: Vec<Book> = self.books.read().await.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);

        let mut joined = Vec::with_capacity(rows.len());
        for book in rows {
            joined.push(self.with_author_name(book).await);
        }
        Ok(joined)
    }

    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> AppResult<Vec<Book>> {
        let mut rows: Vec<Book> = self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.author_id == author_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);

        let mut joined = Vec::with_capacity(rows.len());
        for book in rows {
            joined.push(self.with_author_name(book).await);
        }
        Ok(joined)
    }

    async fn count_by_author(&self, author_id: Uuid) -> AppResult<i64> {
        let count = self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.author_id == author_id)
            .count();
        Ok(count as i64)
    }

    async fn titles(&self) -> AppResult<Vec<BookTitle>> {
        let mut rows: Vec<BookTitle> = self
            .books
            .read()
            .await
            .values()
            .map(|b| BookTitle {
                id: b.id,
                title: b.title.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let book = self.books.read().await.get(&id).cloned();
        match book {
            Some(book) => Ok(Some(self.with_author_name(book).await)),
            None => Ok(None),
        }
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        data.validate()?;
        self.require_author(data.author_id).await?;
        let book = Book {
            id: Uuid::new_v4(),
            title: data.title.clone(),
            description: data.description.clone(),
            publish_date: data.publish_date,
            page_count: data.page_count,
            created_at: Utc::now(),
            cover_image: data.cover_image.clone(),
            cover_image_type: data.cover_image_type.clone(),
            author_id: data.author_id,
            user_id: data.user_id,
            author_name: None,
        };
        self.books.write().await.insert(book.id, book.clone());
        Ok(self.with_author_name(book).await)
    }

    async fn update(&self, id: Uuid, data: &BookChanges) -> AppResult<Option<Book>> {
        data.validate()?;
        self.require_author(data.author_id).await?;
        let updated = {
            let mut books = self.books.write().await;
            books.get_mut(&id).map(|book| {
                book.title = data.title.clone();
                book.description = data.description.clone();
                book.publish_date = data.publish_date;
                book.page_count = data.page_count;
                book.author_id = data.author_id;
                book.user_id = data.user_id;
                if let Some(cover) = &data.cover {
                    book.cover_image = cover.image.clone();
                    book.cover_image_type = cover.image_type.clone();
                }
                book.clone()
            })
        };
        match updated {
            Some(book) => Ok(Some(self.with_author_name(book).await)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        if self.book_instances.read().await.values().any(|i| i.book_id == id) {
            return Err(AppError::Conflict("Book still has copies".to_string()));
        }
        Ok(self.books.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl BookInstancesRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<BookInstance>> {
        let rows: Vec<BookInstance> = self.book_instances.read().await.values().cloned().collect();
        let mut joined = Vec::with_capacity(rows.len());
        for instance in rows {
            joined.push(self.with_book_title(instance).await);
        }
        joined.sort_by(|a, b| {
            a.book_title
                .cmp(&b.book_title)
                .then_with(|| a.imprint.cmp(&b.imprint))
        });
        Ok(joined)
    }

    async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let mut rows: Vec<BookInstance> = self
            .book_instances
            .read()
            .await
            .values()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.imprint.cmp(&b.imprint));

        let mut joined = Vec::with_capacity(rows.len());
        for instance in rows {
            joined.push(self.with_book_title(instance).await);
        }
        Ok(joined)
    }

    async fn count_by_book(&self, book_id: Uuid) -> AppResult<i64> {
        let count = self
            .book_instances
            .read()
            .await
            .values()
            .filter(|i| i.book_id == book_id)
            .count();
        Ok(count as i64)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let instance = self.book_instances.read().await.get(&id).cloned();
        match instance {
            Some(instance) => Ok(Some(self.with_book_title(instance).await)),
            None => Ok(None),
        }
    }

    async fn create(&self, data: &NewBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        self.require_book(data.book_id).await?;
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: data.book_id,
            imprint: data.imprint.clone(),
            status: data.status,
            due_back: data.due_back,
            book_title: None,
        };
        self.book_instances
            .write()
            .await
            .insert(instance.id, instance.clone());
        Ok(self.with_book_title(instance).await)
    }

    async fn update(&self, id: Uuid, data: &NewBookInstance) -> AppResult<Option<BookInstance>> {
        data.validate()?;
        self.require_book(data.book_id).await?;
        let updated = {
            let mut instances = self.book_instances.write().await;
            instances.get_mut(&id).map(|instance| {
                instance.book_id = data.book_id;
                instance.imprint = data.imprint.clone();
                instance.status = data.status;
                instance.due_back = data.due_back;
                instance.clone()
            })
        };
        match updated {
            Some(instance) => Ok(Some(self.with_book_title(instance).await)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.book_instances.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
