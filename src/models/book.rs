//! Book model and related types

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Cover image MIME types accepted on upload
pub const COVER_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub publish_date: NaiveDate,
    pub page_count: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub cover_image: Vec<u8>,
    pub cover_image_type: String,
    pub author_id: Uuid,
    pub user_id: Uuid,
    // Computed fields (populated when queried with JOINs, None otherwise)
    #[sqlx(default)]
    #[serde(default)]
    pub author_name: Option<String>,
}

impl Book {
    pub fn url(&self) -> String {
        format!("/books/{}", self.id)
    }

    /// Inline data URI for the cover, recomputed on every read
    pub fn cover_image_path(&self) -> Option<String> {
        if self.cover_image.is_empty() || self.cover_image_type.is_empty() {
            return None;
        }
        Some(format!(
            "data:{};charset=utf-8;base64,{}",
            self.cover_image_type,
            STANDARD.encode(&self.cover_image)
        ))
    }
}

/// Book id and title, for selection lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

/// Book fields written on create
#[derive(Debug, Clone, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub publish_date: NaiveDate,
    #[validate(range(min = 1, message = "Page count must be positive"))]
    pub page_count: i32,
    #[validate(length(min = 1, message = "Cover image is required"))]
    pub cover_image: Vec<u8>,
    #[validate(length(min = 1, message = "Cover image type is required"))]
    pub cover_image_type: String,
    pub author_id: Uuid,
    pub user_id: Uuid,
}

/// Replacement cover on update
#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub image: Vec<u8>,
    pub image_type: String,
}

/// Book fields written on update; the cover is kept unless replaced
#[derive(Debug, Clone, Validate)]
pub struct BookChanges {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub publish_date: NaiveDate,
    #[validate(range(min = 1, message = "Page count must be positive"))]
    pub page_count: i32,
    pub author_id: Uuid,
    pub user_id: Uuid,
    pub cover: Option<Cover>,
}

/// Book search parameters (raw query strings; empty means unset)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookQuery {
    pub title: Option<String>,
    pub published_after: Option<String>,
    pub published_before: Option<String>,
}

/// Parsed book search filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub published_after: Option<NaiveDate>,
    pub published_before: Option<NaiveDate>,
}

impl BookQuery {
    pub fn filter(&self) -> BookFilter {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }
        BookFilter {
            title: non_empty(&self.title).map(str::to_string),
            published_after: non_empty(&self.published_after).and_then(crate::forms::parse_iso_date),
            published_before: non_empty(&self.published_before).and_then(crate::forms::parse_iso_date),
        }
    }
}

/// Book as exposed to views
#[derive(Debug, Serialize)]
pub struct BookView<'a> {
    #[serde(flatten)]
    pub book: &'a Book,
    pub url: String,
    pub cover_image_path: Option<String>,
    pub publish_date_yyyy_mm_dd: String,
}

impl<'a> From<&'a Book> for BookView<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            book,
            url: book.url(),
            cover_image_path: book.cover_image_path(),
            publish_date_yyyy_mm_dd: book.publish_date.format("%Y-%m-%d").to_string(),
        }
    }
}
