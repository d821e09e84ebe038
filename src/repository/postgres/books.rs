//! Books table

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{like_pattern, map_write_error, PgStore};
use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, BookFilter, BookTitle, NewBook},
    repository::BooksRepository,
};

const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.description, b.publish_date, b.page_count, b.created_at,
    b.cover_image, b.cover_image_type, b.author_id, b.user_id,
    a.name AS author_name
"#;

#[async_trait]
impl BooksRepository for PgStore {
    async fn list(&self, owner: Uuid, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            SELECT {}
            FROM books b LEFT JOIN authors a ON a.id = b.author_id
            WHERE b.user_id = $1
              AND ($2::text IS NULL OR b.title ILIKE $2)
              AND ($3::date IS NULL OR b.publish_date >= $3)
              AND ($4::date IS NULL OR b.publish_date <= $4)
            ORDER BY b.title
            "#,
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(owner)
            .bind(filter.title.as_deref().map(like_pattern))
            .bind(filter.published_after)
            .bind(filter.published_before)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            SELECT {}
            FROM books b LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.created_at DESC
            LIMIT $1
            "#,
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            SELECT {}
            FROM books b LEFT JOIN authors a ON a.id = b.author_id
            WHERE b.author_id = $1
            ORDER BY b.created_at DESC
            LIMIT $2
            "#,
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_author(&self, author_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn titles(&self) -> AppResult<Vec<BookTitle>> {
        let rows = sqlx::query_as::<_, BookTitle>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let query = format!(
            "SELECT {} FROM books b LEFT JOIN authors a ON a.id = b.author_id WHERE b.id = $1",
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, data: &NewBook) -> AppResult<Book> {
        data.validate()?;
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO books (id, title, description, publish_date, page_count, created_at,
                               cover_image, cover_image_type, author_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.publish_date)
        .bind(data.page_count)
        .bind(Utc::now())
        .bind(&data.cover_image)
        .bind(&data.cover_image_type)
        .bind(data.author_id)
        .bind(data.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Book"))?;

        self.get_by_id(id).await?.ok_or_else(|| {
            crate::error::AppError::Internal(format!("Book {} vanished after insert", id))
        })
    }

    async fn update(&self, id: Uuid, data: &BookChanges) -> AppResult<Option<Book>> {
        data.validate()?;
        let (cover_image, cover_image_type) = match &data.cover {
            Some(cover) => (Some(&cover.image), Some(&cover.image_type)),
            None => (None, None),
        };
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = $1, description = $2, publish_date = $3, page_count = $4,
                author_id = $5, user_id = $6,
                cover_image = COALESCE($7, cover_image),
                cover_image_type = COALESCE($8, cover_image_type)
            WHERE id = $9
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.publish_date)
        .bind(data.page_count)
        .bind(data.author_id)
        .bind(data.user_id)
        .bind(cover_image)
        .bind(cover_image_type)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Book"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Book"))?;
        Ok(result.rows_affected() > 0)
    }
}
