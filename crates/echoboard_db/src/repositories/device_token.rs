//! Repository for device tokens
//!
//! A device token is one push registration of one user's device. The
//! notification engine only reads active tokens, deactivates dead ones and
//! stamps successful deliveries; registration is driven by the app clients.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

pub use echoboard_common::models::DeviceToken;

/// Repository for device tokens
pub trait DeviceTokenRepository {
    /// Create the `device_tokens` table if it doesn't exist.
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Find every active token of a user, oldest registration first.
    ///
    /// Inactive tokens are never returned.
    fn find_active_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<DeviceToken>, DbError>> + Send;

    /// Find a registration by its gateway token, active or not.
    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<DeviceToken>, DbError>> + Send;

    /// Register a device token for a user.
    ///
    /// A token seen before is reactivated and reassigned to `user_id`; a new
    /// token gets a fresh row.
    ///
    /// # Returns
    ///
    /// The stored registration
    fn register(
        &self,
        user_id: Uuid,
        token: &str,
        platform: &str,
    ) -> impl Future<Output = Result<DeviceToken, DbError>> + Send;

    /// Mark a token inactive. Deactivating an inactive token is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if the token exists
    fn deactivate(&self, id: Uuid) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Record a successful delivery at `at`.
    ///
    /// # Returns
    ///
    /// `true` if the token exists
    fn touch(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}
