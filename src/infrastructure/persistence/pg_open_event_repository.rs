//! PostgreSQL implementation of the open-event repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::EmailOpenMessage;
use crate::domain::repositories::OpenEventRepository;
use crate::error::AppError;

/// PostgreSQL repository storing delivered open events.
///
/// Custom values are stored as a JSONB object.
pub struct PgOpenEventRepository {
    pool: Arc<PgPool>,
}

impl PgOpenEventRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpenEventRepository for PgOpenEventRepository {
    async fn record_open(&self, event: &EmailOpenMessage) -> Result<(), AppError> {
        let custom_values = serde_json::to_value(&event.custom_values).map_err(|e| {
            AppError::internal(
                "Invalid custom values",
                serde_json::json!({ "reason": e.to_string() }),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO email_open_events (
                message_id, instance_id, contact_source, contact_identifier,
                ip_address, user_agent, site_name, target_language,
                test_value_index, email_address_history_entry_id,
                custom_values, request_registered
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.message_id)
        .bind(event.instance_id)
        .bind(&event.contact_identifier.source)
        .bind(&event.contact_identifier.identifier)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(&event.site_name)
        .bind(&event.target_language)
        .bind(event.test_value_index)
        .bind(event.email_address_history_entry_id)
        .bind(custom_values)
        .bind(event.request_registered)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
