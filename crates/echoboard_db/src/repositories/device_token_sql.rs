//! SQL implementation of the device token repository

use crate::error::DbError;
use crate::repositories::device_token::{DeviceToken, DeviceTokenRepository};
use crate::repositories::row::{
    bool_to_int, format_timestamp, get_bool, get_optional_timestamp, get_string, get_uuid,
    query_error,
};
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use tracing::{debug, info};
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, token, platform, active, last_used_at, created_at";

/// SQL implementation of the device token repository
#[derive(Debug, Clone)]
pub struct SqlDeviceTokenRepository {
    db_client: DbClient,
}

impl SqlDeviceTokenRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn map_row(row: &AnyRow) -> Result<DeviceToken, DbError> {
        Ok(DeviceToken {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            token: get_string(row, "token")?,
            platform: get_string(row, "platform")?,
            active: get_bool(row, "active")?,
            last_used_at: get_optional_timestamp(row, "last_used_at")?,
            created_at: get_optional_timestamp(row, "created_at")?,
        })
    }
}

impl DeviceTokenRepository for SqlDeviceTokenRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device token schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS device_tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                token TEXT NOT NULL UNIQUE,
                platform TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                last_used_at TEXT,
                created_at TEXT NOT NULL
            )
        "#,
            )
            .await?;
        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS idx_device_tokens_user ON device_tokens (user_id)")
            .await?;

        info!("Device token schema initialized successfully");
        Ok(())
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<DeviceToken>, DbError> {
        debug!("Finding active device tokens for user: {}", user_id);

        let query = format!(
            "SELECT {} FROM device_tokens WHERE user_id = $1 AND active = 1 \
             ORDER BY created_at, rowid",
            COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to find device tokens", e))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<DeviceToken>, DbError> {
        let query = format!("SELECT {} FROM device_tokens WHERE token = $1", COLUMNS);

        let row = sqlx::query(&query)
            .bind(token)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to find device token", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn register(
        &self,
        user_id: Uuid,
        token: &str,
        platform: &str,
    ) -> Result<DeviceToken, DbError> {
        debug!("Registering device token for user: {}", user_id);

        let mut tx = self.db_client.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO device_tokens (id, user_id, token, platform, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (token) DO UPDATE SET
                user_id = excluded.user_id,
                platform = excluded.platform,
                active = excluded.active
        "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(token)
        .bind(platform)
        .bind(bool_to_int(true))
        .bind(format_timestamp(&Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| query_error("Failed to register device token", e))?;

        let query = format!("SELECT {} FROM device_tokens WHERE token = $1", COLUMNS);
        let row = sqlx::query(&query)
            .bind(token)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to read registered device token", e))?;
        let registered = Self::map_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Device token {} registered", registered.id);
        Ok(registered)
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, DbError> {
        debug!("Deactivating device token: {}", id);

        let result = sqlx::query("UPDATE device_tokens SET active = 0 WHERE id = $1")
            .bind(id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to deactivate device token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE device_tokens SET last_used_at = $1 WHERE id = $2")
            .bind(format_timestamp(&at))
            .bind(id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to update device token last use", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqlDeviceTokenRepository {
        let db = DbClient::from_url("sqlite::memory:").await.unwrap();
        let repo = SqlDeviceTokenRepository::new(db);
        repo.init_schema().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn register_then_find_active() {
        let repo = repo().await;
        let user = Uuid::new_v4();

        let first = repo.register(user, "token-a", "ios").await.unwrap();
        repo.register(user, "token-b", "ios").await.unwrap();

        let active = repo.find_active_by_user(user).await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, first.id);
        assert!(active.iter().all(|t| t.active));
        assert!(repo.find_active_by_user(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deactivated_tokens_are_not_selected_and_deactivation_is_idempotent() {
        let repo = repo().await;
        let user = Uuid::new_v4();
        let token = repo.register(user, "token-a", "ios").await.unwrap();

        assert!(repo.deactivate(token.id).await.unwrap());
        assert!(repo.deactivate(token.id).await.unwrap());
        assert!(repo.find_active_by_user(user).await.unwrap().is_empty());

        let stored = repo.find_by_token("token-a").await.unwrap().unwrap();
        assert!(!stored.active);
        assert!(!repo.deactivate(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn registering_a_known_token_reactivates_and_reassigns_it() {
        let repo = repo().await;
        let old_owner = Uuid::new_v4();
        let new_owner = Uuid::new_v4();

        let original = repo.register(old_owner, "shared", "ios").await.unwrap();
        repo.deactivate(original.id).await.unwrap();

        let again = repo.register(new_owner, "shared", "ipados").await.unwrap();
        assert_eq!(again.id, original.id);
        assert_eq!(again.user_id, new_owner);
        assert_eq!(again.platform, "ipados");
        assert!(again.active);
        assert!(repo.find_active_by_user(old_owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn touch_sets_last_used_at() {
        let repo = repo().await;
        let token = repo.register(Uuid::new_v4(), "token-a", "ios").await.unwrap();
        assert!(token.last_used_at.is_none());

        let now = Utc::now();
        assert!(repo.touch(token.id, now).await.unwrap());

        let stored = repo.find_by_token("token-a").await.unwrap().unwrap();
        let last_used = stored.last_used_at.unwrap();
        assert_eq!(last_used.timestamp_micros(), now.timestamp_micros());
    }
}
