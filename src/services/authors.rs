//! Author management service, scoped to the requesting user

use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, NewAuthor},
        book::Book,
    },
    repository::Repository,
};

/// Result of a change to an existing author
#[derive(Debug)]
pub enum AuthorChange {
    /// The change was stored
    Done(Author),
    /// The author could not be fetched
    Missing,
    /// The author exists but the change was rejected; carries the attempted state
    Failed(Author),
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    config: CatalogConfig,
}

impl AuthorsService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Authors owned by `owner`, filtered by the optional name search
    pub async fn list(&self, owner: Uuid, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        self.repository.authors.list(owner, query.name_filter()).await
    }

    pub async fn create(&self, owner: Uuid, name: &str) -> AppResult<Author> {
        let author = self
            .repository
            .authors
            .create(&NewAuthor {
                name: name.to_string(),
                user_id: owner,
            })
            .await?;
        tracing::info!(author_id = %author.id, "Author created");
        Ok(author)
    }

    /// Fetch an author by id, hiding other users' records when ownership is enforced
    pub async fn find(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Author>> {
        let author = self.repository.authors.get_by_id(id).await?;
        Ok(author.filter(|a| !self.config.enforce_ownership || a.user_id == owner))
    }

    /// Author with a bounded list of their books
    pub async fn show(&self, owner: Uuid, id: Uuid) -> AppResult<Option<(Author, Vec<Book>)>> {
        let Some(author) = self.find(owner, id).await? else {
            return Ok(None);
        };
        let books = self
            .repository
            .books
            .list_by_author(author.id, self.config.author_books_limit)
            .await?;
        Ok(Some((author, books)))
    }

    /// Rename an author; the requester becomes its owner
    pub async fn update(&self, owner: Uuid, id: Uuid, name: &str) -> AuthorChange {
        let mut author = match self.find(owner, id).await {
            Ok(Some(author)) => author,
            Ok(None) => return AuthorChange::Missing,
            Err(e) => {
                tracing::warn!(author_id = %id, "Failed to fetch author for update: {}", e);
                return AuthorChange::Missing;
            }
        };

        author.name = name.to_string();
        author.user_id = owner;
        let changes = NewAuthor {
            name: author.name.clone(),
            user_id: owner,
        };

        match self.repository.authors.update(id, &changes).await {
            Ok(Some(saved)) => AuthorChange::Done(saved),
            Ok(None) => AuthorChange::Missing,
            Err(e) => {
                tracing::warn!(author_id = %id, "Failed to update author: {}", e);
                AuthorChange::Failed(author)
            }
        }
    }

    /// Remove an author that has no books
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> AuthorChange {
        let author = match self.find(owner, id).await {
            Ok(Some(author)) => author,
            Ok(None) => return AuthorChange::Missing,
            Err(e) => {
                tracing::warn!(author_id = %id, "Failed to fetch author for delete: {}", e);
                return AuthorChange::Missing;
            }
        };

        match self.repository.books.count_by_author(id).await {
            Ok(0) => {}
            Ok(count) => {
                tracing::warn!(author_id = %id, books = count, "Refusing to delete author with books");
                return AuthorChange::Failed(author);
            }
            Err(e) => {
                tracing::warn!(author_id = %id, "Failed to count author books: {}", e);
                return AuthorChange::Failed(author);
            }
        }

        match self.repository.authors.delete(id).await {
            Ok(true) => {
                tracing::info!(author_id = %id, "Author deleted");
                AuthorChange::Done(author)
            }
            Ok(false) => AuthorChange::Missing,
            Err(e) => {
                tracing::warn!(author_id = %id, "Failed to delete author: {}", e);
                AuthorChange::Failed(author)
            }
        }
    }
}
