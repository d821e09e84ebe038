//! Book management service

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    forms::parse_iso_date,
    models::{
        book::{Book, BookChanges, BookQuery, Cover, NewBook, COVER_IMAGE_TYPES},
        book_instance::BookInstance,
    },
    repository::Repository,
};

/// Book form as submitted (multipart), echoed back when a save fails
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookSubmission {
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub page_count: String,
    pub description: String,
    #[serde(skip)]
    pub cover: Option<Cover>,
}

/// Book fields parsed from a submission
struct ParsedBook {
    title: String,
    description: Option<String>,
    publish_date: NaiveDate,
    page_count: i32,
    author_id: Uuid,
}

impl BookSubmission {
    fn parse(&self) -> AppResult<ParsedBook> {
        let author_id = Uuid::parse_str(self.author.trim())
            .map_err(|_| AppError::Validation("Author must be specified".to_string()))?;
        let publish_date = parse_iso_date(self.publish_date.trim())
            .ok_or_else(|| AppError::Validation("Invalid publish date".to_string()))?;
        let page_count = self
            .page_count
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::Validation("Invalid page count".to_string()))?;
        if let Some(cover) = &self.cover {
            if !COVER_IMAGE_TYPES.contains(&cover.image_type.as_str()) {
                return Err(AppError::Validation(format!(
                    "Unsupported cover image type: {}",
                    cover.image_type
                )));
            }
        }
        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());

        Ok(ParsedBook {
            title: self.title.trim().to_string(),
            description,
            publish_date,
            page_count,
            author_id,
        })
    }
}

/// Result of a change to an existing book
#[derive(Debug)]
pub enum BookChange {
    Done(Book),
    Missing,
    Failed(Book),
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    config: CatalogConfig,
}

impl BooksService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self, owner: Uuid, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.list(owner, &query.filter()).await
    }

    /// Newest books for the home page
    pub async fn recent(&self) -> AppResult<Vec<Book>> {
        self.repository.books.recent(self.config.home_recent_limit).await
    }

    pub async fn find(&self, owner: Uuid, id: Uuid) -> AppResult<Option<Book>> {
        let book = self.repository.books.get_by_id(id).await?;
        Ok(book.filter(|b| !self.config.enforce_ownership || b.user_id == owner))
    }

    /// Book with its copies
    pub async fn show(&self, owner: Uuid, id: Uuid) -> AppResult<Option<(Book, Vec<BookInstance>)>> {
        let Some(book) = self.find(owner, id).await? else {
            return Ok(None);
        };
        let copies = self.repository.book_instances.list_by_book(book.id).await?;
        Ok(Some((book, copies)))
    }

    async fn require_author(&self, owner: Uuid, author_id: Uuid) -> AppResult<()> {
        let author = self.repository.authors.get_by_id(author_id).await?;
        match author {
            Some(a) if !self.config.enforce_ownership || a.user_id == owner => Ok(()),
            _ => Err(AppError::Validation("Author not found".to_string())),
        }
    }

    pub async fn create(&self, owner: Uuid, submission: &BookSubmission) -> AppResult<Book> {
        let parsed = submission.parse()?;
        self.require_author(owner, parsed.author_id).await?;
        let cover = submission
            .cover
            .clone()
            .ok_or_else(|| AppError::Validation("Cover image is required".to_string()))?;

        let book = self
            .repository
            .books
            .create(&NewBook {
                title: parsed.title,
                description: parsed.description,
                publish_date: parsed.publish_date,
                page_count: parsed.page_count,
                cover_image: cover.image,
                cover_image_type: cover.image_type,
                author_id: parsed.author_id,
                user_id: owner,
            })
            .await?;
        tracing::info!(book_id = %book.id, "Book created");
        Ok(book)
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, submission: &BookSubmission) -> BookChange {
        let book = match self.find(owner, id).await {
            Ok(Some(book)) => book,
            Ok(None) => return BookChange::Missing,
            Err(e) => {
                tracing::warn!(book_id = %id, "Failed to fetch book for update: {}", e);
                return BookChange::Missing;
            }
        };

        let result: AppResult<Option<Book>> = async {
            let parsed = submission.parse()?;
            self.require_author(owner, parsed.author_id).await?;
            self.repository
                .books
                .update(
                    id,
                    &BookChanges {
                        title: parsed.title,
                        description: parsed.description,
                        publish_date: parsed.publish_date,
                        page_count: parsed.page_count,
                        author_id: parsed.author_id,
                        user_id: owner,
                        cover: submission.cover.clone(),
                    },
                )
                .await
        }
        .await;

        match result {
            Ok(Some(saved)) => BookChange::Done(saved),
            Ok(None) => BookChange::Missing,
            Err(e) => {
                tracing::warn!(book_id = %id, "Failed to update book: {}", e);
                BookChange::Failed(book)
            }
        }
    }

    /// Remove a book that has no copies
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> BookChange {
        let book = match self.find(owner, id).await {
            Ok(Some(book)) => book,
            Ok(None) => return BookChange::Missing,
            Err(e) => {
                tracing::warn!(book_id = %id, "Failed to fetch book for delete: {}", e);
                return BookChange::Missing;
            }
        };

        match self.repository.book_instances.count_by_book(id).await {
            Ok(0) => {}
            Ok(count) => {
                tracing::warn!(book_id = %id, copies = count, "Refusing to delete book with copies");
                return BookChange::Failed(book);
            }
            Err(e) => {
                tracing::warn!(book_id = %id, "Failed to count book copies: {}", e);
                return BookChange::Failed(book);
            }
        }

        match self.repository.books.delete(id).await {
            Ok(true) => {
                tracing::info!(book_id = %id, "Book deleted");
                BookChange::Done(book)
            }
            Ok(false) => BookChange::Missing,
            Err(e) => {
                tracing::warn!(book_id = %id, "Failed to delete book: {}", e);
                BookChange::Failed(book)
            }
        }
    }
}
