//! PostgreSQL store

mod authors;
mod book_instances;
mod books;
mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Map constraint violations to conflicts, everything else stays a database fault
fn map_write_error(e: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("23505") => return AppError::Conflict(format!("{} already exists", what)),
            Some("23503") => {
                return AppError::Conflict(format!("{} is still referenced or references a missing record", what))
            }
            _ => {}
        }
    }
    AppError::Database(e)
}
