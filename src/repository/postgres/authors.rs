//! Authors table

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{like_pattern, map_write_error, PgStore};
use crate::{
    error::AppResult,
    models::author::{Author, NewAuthor},
    repository::AuthorsRepository,
};

#[async_trait]
impl AuthorsRepository for PgStore {
    async fn list(&self, owner: Uuid, name: Option<String>) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, name, user_id, created_at
            FROM authors
            WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY name
            "#,
        )
        .bind(owner)
        .bind(name.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(
            "SELECT id, name, user_id, created_at FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, data: &NewAuthor) -> AppResult<Author> {
        data.validate()?;
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (id, name, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Author"))
    }

    async fn update(&self, id: Uuid, data: &NewAuthor) -> AppResult<Option<Author>> {
        data.validate()?;
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET name = $1, user_id = $2
            WHERE id = $3
            RETURNING id, name, user_id, created_at
            "#,
        )
        .bind(&data.name)
        .bind(data.user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Author"))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Author"))?;
        Ok(result.rows_affected() > 0)
    }
}
