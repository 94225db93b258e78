//! PostgreSQL implementation of the message repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::MessageItem;
use crate::domain::repositories::MessageRepository;
use crate::error::AppError;

/// PostgreSQL repository for message definitions.
pub struct PgMessageRepository {
    pool: Arc<PgPool>,
}

impl PgMessageRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageItem>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            SELECT id, name, target_language
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(id, name, target_language)| MessageItem::new(id, name, target_language)))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
