//! 이미지 Repository (PostgreSQL).

use async_trait::async_trait;
use picstore_core::{Image, NewImage, ServiceResult, UserId};
use sqlx::PgPool;

use super::ImageStore;

/// PostgreSQL 이미지 메타데이터 저장소.
#[derive(Debug, Clone)]
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn create(&self, image: NewImage) -> ServiceResult<Image> {
        let record = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (user_id, image_path, image_key)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, image_path, image_key, created_at
            "#,
        )
        .bind(image.user_id)
        .bind(&image.image_path)
        .bind(&image.image_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Image>> {
        let records = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, user_id, image_path, image_key, created_at
            FROM images
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_by_key(&self, image_key: &str) -> ServiceResult<Option<Image>> {
        let record = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, user_id, image_path, image_key, created_at
            FROM images
            WHERE image_key = $1
            "#,
        )
        .bind(image_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
