//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use uuid::Uuid;
use validator::Validate;

/// Availability of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Available,
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }

    /// Parse a submitted status; empty selects the default
    pub fn from_form(value: &str) -> Option<Self> {
        if value.is_empty() {
            return Some(Self::default());
        }
        value.parse().ok()
    }
}

impl std::fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookInstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookInstanceStatus::Available),
            "Maintenance" => Ok(BookInstanceStatus::Maintenance),
            "Loaned" => Ok(BookInstanceStatus::Loaned),
            "Reserved" => Ok(BookInstanceStatus::Reserved),
            _ => Err(format!("Invalid book instance status: {}", s)),
        }
    }
}

// SQLx conversion for BookInstanceStatus (stored as text)
impl sqlx::Type<Postgres> for BookInstanceStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookInstanceStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookInstanceStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Full book instance model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
    // Computed field (populated when queried with a JOIN on books)
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        format!("/bookinstances/{}", self.id)
    }

    /// Due date for display, e.g. `Oct 14, 2026`
    pub fn due_back_formatted(&self) -> String {
        self.due_back
            .map(|d| d.format("%b %-d, %Y").to_string())
            .unwrap_or_default()
    }

    /// Due date for date inputs
    pub fn due_back_yyyy_mm_dd(&self) -> String {
        self.due_back
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Book instance fields written on create and update
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewBookInstance {
    pub book_id: Uuid,
    #[validate(length(min = 1, message = "Imprint is required"))]
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

/// Book instance as exposed to views
#[derive(Debug, Serialize)]
pub struct BookInstanceView<'a> {
    #[serde(flatten)]
    pub instance: &'a BookInstance,
    pub url: String,
    pub book_url: String,
    pub due_back_formatted: String,
    pub due_back_yyyy_mm_dd: String,
}

impl<'a> From<&'a BookInstance> for BookInstanceView<'a> {
    fn from(instance: &'a BookInstance) -> Self {
        Self {
            instance,
            url: instance.url(),
            book_url: format!("/books/{}", instance.book_id),
            due_back_formatted: instance.due_back_formatted(),
            due_back_yyyy_mm_dd: instance.due_back_yyyy_mm_dd(),
        }
    }
}
