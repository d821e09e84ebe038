//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Author record, owned by the user who created it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Author {
    pub fn url(&self) -> String {
        format!("/authors/{}", self.id)
    }
}

/// Author fields written on create and update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewAuthor {
    #[validate(length(min = 1, message = "Author name is required"))]
    pub name: String,
    pub user_id: Uuid,
}

/// Author as exposed to views
#[derive(Debug, Serialize)]
pub struct AuthorView<'a> {
    #[serde(flatten)]
    pub author: &'a Author,
    pub url: String,
}

impl<'a> From<&'a Author> for AuthorView<'a> {
    fn from(author: &'a Author) -> Self {
        Self {
            author,
            url: author.url(),
        }
    }
}

/// Author search parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthorQuery {
    pub name: Option<String>,
}

impl AuthorQuery {
    /// Name filter, ignoring an empty search box
    pub fn name_filter(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
