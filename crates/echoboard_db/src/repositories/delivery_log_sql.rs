//! SQL implementation of the delivery log repository

use crate::error::DbError;
use crate::repositories::delivery_log::{DeliveryLogEntry, DeliveryLogRepository};
use crate::repositories::row::{
    format_timestamp, get_optional_string, get_optional_uuid, get_string, get_timestamp, get_uuid,
    query_error,
};
use crate::DbClient;
use sqlx::any::AnyRow;
use tracing::{debug, info};
use uuid::Uuid;

/// SQL implementation of the delivery log repository
#[derive(Debug, Clone)]
pub struct SqlDeliveryLogRepository {
    db_client: DbClient,
}

impl SqlDeliveryLogRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn map_row(row: &AnyRow) -> Result<DeliveryLogEntry, DbError> {
        let notification_type = get_string(row, "notification_type")?
            .parse()
            .map_err(DbError::DecodeError)?;
        let outcome = get_string(row, "outcome")?
            .parse()
            .map_err(DbError::DecodeError)?;

        Ok(DeliveryLogEntry {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            device_token_id: get_optional_uuid(row, "device_token_id")?,
            notification_type,
            outcome,
            error_message: get_optional_string(row, "error_message")?,
            feedback_id: get_optional_uuid(row, "feedback_id")?,
            project_id: get_optional_uuid(row, "project_id")?,
            created_at: get_timestamp(row, "created_at")?,
        })
    }
}

impl DeliveryLogRepository for SqlDeliveryLogRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing delivery log schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS push_delivery_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                device_token_id TEXT,
                notification_type TEXT NOT NULL,
                outcome TEXT NOT NULL,
                error_message TEXT,
                feedback_id TEXT,
                project_id TEXT,
                created_at TEXT NOT NULL
            )
        "#,
            )
            .await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_push_delivery_logs_user \
                 ON push_delivery_logs (user_id, created_at)",
            )
            .await?;

        info!("Delivery log schema initialized successfully");
        Ok(())
    }

    async fn append(&self, entry: &DeliveryLogEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO push_delivery_logs
                (id, user_id, device_token_id, notification_type, outcome,
                 error_message, feedback_id, project_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.device_token_id.map(|id| id.to_string()))
        .bind(entry.notification_type.as_str())
        .bind(entry.outcome.as_str())
        .bind(entry.error_message.clone())
        .bind(entry.feedback_id.map(|id| id.to_string()))
        .bind(entry.project_id.map(|id| id.to_string()))
        .bind(format_timestamp(&entry.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to append delivery log entry", e))?;

        debug!(
            "Recorded {} delivery for user {}",
            entry.outcome, entry.user_id
        );
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<DeliveryLogEntry>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, device_token_id, notification_type, outcome,
                   error_message, feedback_id, project_id, created_at
            FROM push_delivery_logs
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
        "#,
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to read delivery log", e))?;

        rows.iter().map(Self::map_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use echoboard_common::models::{DeliveryOutcome, NotificationType};

    fn entry(user_id: Uuid, outcome: DeliveryOutcome, minutes_ago: i64) -> DeliveryLogEntry {
        DeliveryLogEntry {
            id: Uuid::new_v4(),
            user_id,
            device_token_id: Some(Uuid::new_v4()),
            notification_type: NotificationType::NewComment,
            outcome,
            error_message: (outcome != DeliveryOutcome::Sent).then(|| "BadDeviceToken".to_string()),
            feedback_id: Some(Uuid::new_v4()),
            project_id: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn entries_come_back_newest_first() {
        let db = DbClient::from_url("sqlite::memory:").await.unwrap();
        let repo = SqlDeliveryLogRepository::new(db);
        repo.init_schema().await.unwrap();

        let user = Uuid::new_v4();
        let old = entry(user, DeliveryOutcome::TokenExpired, 10);
        let new = entry(user, DeliveryOutcome::Sent, 1);
        repo.append(&old).await.unwrap();
        repo.append(&new).await.unwrap();
        repo.append(&entry(Uuid::new_v4(), DeliveryOutcome::Failed, 0))
            .await
            .unwrap();

        let found = repo.find_by_user(user, 10).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, new.id);
        assert_eq!(found[1].outcome, DeliveryOutcome::TokenExpired);
        assert_eq!(found[1].error_message.as_deref(), Some("BadDeviceToken"));
        assert_eq!(found[1].project_id, None);

        assert_eq!(repo.find_by_user(user, 1).await.unwrap().len(), 1);
    }
}
