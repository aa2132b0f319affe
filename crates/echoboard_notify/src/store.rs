//! The persistence boundary of the notification engine
//!
//! The engine reads the audience and device registrations and writes device
//! state and delivery log entries through [`NotificationStore`]. The SQL
//! adapter lives behind the `database` feature; tests use an in-memory store.

use chrono::{DateTime, Utc};
use echoboard_common::models::{
    DeliveryLogEntry, DeviceToken, Project, ProjectMemberPreference, User, Vote,
};
use echoboard_common::services::BoxFuture;
use uuid::Uuid;

/// Everything a dispatch run reads or writes.
pub trait NotificationStore: Send + Sync + 'static {
    /// Error type returned by store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_project(&self, id: Uuid) -> BoxFuture<'_, Option<Project>, Self::Error>;

    fn find_user(&self, id: Uuid) -> BoxFuture<'_, Option<User>, Self::Error>;

    /// Case-insensitive lookup of a registered user by email.
    fn find_user_by_email<'a>(&'a self, email: &'a str)
        -> BoxFuture<'a, Option<User>, Self::Error>;

    /// Users with a membership in the project (owner excluded unless a member).
    fn find_member_users(&self, project_id: Uuid) -> BoxFuture<'_, Vec<User>, Self::Error>;

    fn find_member_preference(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> BoxFuture<'_, Option<ProjectMemberPreference>, Self::Error>;

    fn find_votes(&self, feedback_id: Uuid) -> BoxFuture<'_, Vec<Vote>, Self::Error>;

    /// Active device registrations of a user.
    fn active_devices(&self, user_id: Uuid) -> BoxFuture<'_, Vec<DeviceToken>, Self::Error>;

    /// Mark a device inactive. Must be idempotent.
    fn deactivate_device(&self, device_id: Uuid) -> BoxFuture<'_, (), Self::Error>;

    /// Stamp a successful delivery.
    fn touch_device(&self, device_id: Uuid, at: DateTime<Utc>) -> BoxFuture<'_, (), Self::Error>;

    /// Append one delivery log entry.
    fn record_delivery<'a>(&'a self, entry: &'a DeliveryLogEntry) -> BoxFuture<'a, (), Self::Error>;
}

#[cfg(feature = "database")]
mod sql {
    use super::*;
    use echoboard_db::{
        AudienceRepository, DbClient, DbError, DeliveryLogRepository, DeviceTokenRepository,
        RepositoryFactory, SqlAudienceRepository, SqlDeliveryLogRepository,
        SqlDeviceTokenRepository, SqlRepositoryFactory,
    };
    use tracing::info;

    /// `NotificationStore` over the SQL repositories of `echoboard-db`.
    #[derive(Debug, Clone)]
    pub struct SqlNotificationStore {
        audience: SqlAudienceRepository,
        devices: SqlDeviceTokenRepository,
        delivery_log: SqlDeliveryLogRepository,
    }

    impl SqlNotificationStore {
        pub fn new(db_client: DbClient) -> Self {
            let factory = SqlRepositoryFactory::new();
            Self {
                audience: factory.create_repository(db_client.clone()),
                devices: factory.create_repository(db_client.clone()),
                delivery_log: factory.create_repository(db_client),
            }
        }

        /// Create every table the engine touches.
        pub async fn init_schema(&self) -> Result<(), DbError> {
            self.audience.init_schema().await?;
            self.devices.init_schema().await?;
            self.delivery_log.init_schema().await?;
            info!("Notification store schema ready");
            Ok(())
        }

        pub fn audience(&self) -> &SqlAudienceRepository {
            &self.audience
        }

        pub fn devices(&self) -> &SqlDeviceTokenRepository {
            &self.devices
        }

        pub fn delivery_log(&self) -> &SqlDeliveryLogRepository {
            &self.delivery_log
        }
    }

    impl NotificationStore for SqlNotificationStore {
        type Error = DbError;

        fn find_project(&self, id: Uuid) -> BoxFuture<'_, Option<Project>, DbError> {
            Box::pin(self.audience.find_project(id))
        }

        fn find_user(&self, id: Uuid) -> BoxFuture<'_, Option<User>, DbError> {
            Box::pin(self.audience.find_user(id))
        }

        fn find_user_by_email<'a>(
            &'a self,
            email: &'a str,
        ) -> BoxFuture<'a, Option<User>, DbError> {
            Box::pin(self.audience.find_user_by_email(email))
        }

        fn find_member_users(&self, project_id: Uuid) -> BoxFuture<'_, Vec<User>, DbError> {
            Box::pin(self.audience.find_member_users(project_id))
        }

        fn find_member_preference(
            &self,
            user_id: Uuid,
            project_id: Uuid,
        ) -> BoxFuture<'_, Option<ProjectMemberPreference>, DbError> {
            Box::pin(self.audience.find_member_preference(user_id, project_id))
        }

        fn find_votes(&self, feedback_id: Uuid) -> BoxFuture<'_, Vec<Vote>, DbError> {
            Box::pin(self.audience.find_votes_for_feedback(feedback_id))
        }

        fn active_devices(&self, user_id: Uuid) -> BoxFuture<'_, Vec<DeviceToken>, DbError> {
            Box::pin(self.devices.find_active_by_user(user_id))
        }

        fn deactivate_device(&self, device_id: Uuid) -> BoxFuture<'_, (), DbError> {
            Box::pin(async move {
                self.devices.deactivate(device_id).await?;
                Ok(())
            })
        }

        fn touch_device(&self, device_id: Uuid, at: DateTime<Utc>) -> BoxFuture<'_, (), DbError> {
            Box::pin(async move {
                self.devices.touch(device_id, at).await?;
                Ok(())
            })
        }

        fn record_delivery<'a>(
            &'a self,
            entry: &'a DeliveryLogEntry,
        ) -> BoxFuture<'a, (), DbError> {
            Box::pin(self.delivery_log.append(entry))
        }
    }
}

#[cfg(feature = "database")]
pub use sql::SqlNotificationStore;
