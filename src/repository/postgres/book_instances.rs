//! Book instances table

use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use super::{map_write_error, PgStore};
use crate::{
    error::AppResult,
    models::book_instance::{BookInstance, NewBookInstance},
    repository::BookInstancesRepository,
};

#[async_trait]
impl BookInstancesRepository for PgStore {
    async fn list(&self) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.status, i.due_back, b.title AS book_title
            FROM book_instances i LEFT JOIN books b ON b.id = i.book_id
            ORDER BY b.title, i.imprint
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.status, i.due_back, b.title AS book_title
            FROM book_instances i LEFT JOIN books b ON b.id = i.book_id
            WHERE i.book_id = $1
            ORDER BY i.imprint
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_by_book(&self, book_id: Uuid) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.status, i.due_back, b.title AS book_title
            FROM book_instances i LEFT JOIN books b ON b.id = i.book_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, data: &NewBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.status)
        .bind(data.due_back)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Book copy"))?;

        self.get_by_id(id).await?.ok_or_else(|| {
            crate::error::AppError::Internal(format!("Book copy {} vanished after insert", id))
        })
    }

    async fn update(&self, id: Uuid, data: &NewBookInstance) -> AppResult<Option<BookInstance>> {
        data.validate()?;
        let result = sqlx::query(
            r#"
            UPDATE book_instances SET book_id = $1, imprint = $2, status = $3, due_back = $4
            WHERE id = $5
            "#,
        )
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.status)
        .bind(data.due_back)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Book copy"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
