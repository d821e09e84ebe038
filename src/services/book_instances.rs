//! Book instance (physical copy) service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    forms::{BookInstanceForm, BookInstanceInput, FieldError, BOOK_UNKNOWN},
    models::{
        book::BookTitle,
        book_instance::{BookInstance, NewBookInstance},
    },
    repository::Repository,
};

pub const NOT_FOUND: &str = "Book copy not found";

/// A submission that failed validation, ready to re-render
#[derive(Debug)]
pub struct RejectedForm {
    /// Sanitized input as entered
    pub input: BookInstanceInput,
    pub errors: Vec<FieldError>,
    /// Freshly fetched selection list
    pub books: Vec<BookTitle>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Saved(BookInstance),
    Rejected(RejectedForm),
}

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All copies, with their book title
    pub async fn list(&self) -> AppResult<Vec<BookInstance>> {
        self.repository.book_instances.list().await
    }

    /// One copy; absence is a not-found error
    pub async fn detail(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository
            .book_instances
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Books offered in the copy form
    pub async fn books(&self) -> AppResult<Vec<BookTitle>> {
        self.repository.books.titles().await
    }

    /// Copy to edit along with the selection list
    pub async fn edit(&self, id: Uuid) -> AppResult<(BookInstance, Vec<BookTitle>)> {
        let instance = self.detail(id).await?;
        let books = self.books().await?;
        Ok((instance, books))
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        self.repository.book_instances.get_by_id(id).await
    }

    pub async fn create(&self, form: &BookInstanceForm) -> AppResult<SubmitOutcome> {
        let new = match self.check(form).await? {
            Ok(new) => new,
            Err(rejected) => return Ok(SubmitOutcome::Rejected(rejected)),
        };
        let instance = self.repository.book_instances.create(&new).await?;
        tracing::info!(book_instance_id = %instance.id, "Book copy created");
        Ok(SubmitOutcome::Saved(instance))
    }

    /// Overwrite a copy by id
    pub async fn update(&self, id: Uuid, form: &BookInstanceForm) -> AppResult<SubmitOutcome> {
        let new = match self.check(form).await? {
            Ok(new) => new,
            Err(rejected) => return Ok(SubmitOutcome::Rejected(rejected)),
        };
        let instance = self
            .repository
            .book_instances
            .update(id, &new)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
        tracing::info!(book_instance_id = %instance.id, "Book copy updated");
        Ok(SubmitOutcome::Saved(instance))
    }

    /// Remove a copy. Deleting an absent copy is not an error.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.find(id).await?.is_none() {
            tracing::debug!(book_instance_id = %id, "Book copy already gone");
        }
        if self.repository.book_instances.delete(id).await? {
            tracing::info!(book_instance_id = %id, "Book copy deleted");
        }
        Ok(())
    }

    /// Sanitize and validate a submission, including that the book exists
    async fn check(&self, form: &BookInstanceForm) -> AppResult<Result<NewBookInstance, RejectedForm>> {
        let input = form.sanitize();
        let errors = match input.check() {
            Ok(new) => match self.repository.books.get_by_id(new.book_id).await? {
                Some(_) => return Ok(Ok(new)),
                None => vec![FieldError::new("book", BOOK_UNKNOWN, &input.book)],
            },
            Err(errors) => errors,
        };
        let books = self.books().await?;
        Ok(Err(RejectedForm {
            input,
            errors,
            books,
        }))
    }
}
