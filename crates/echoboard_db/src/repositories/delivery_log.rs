//! Repository for the push delivery log
//!
//! The log is an append-only audit trail: one row per device delivery attempt.
//! There is deliberately no update or delete operation.

use crate::error::DbError;
use std::future::Future;
use uuid::Uuid;

pub use echoboard_common::models::DeliveryLogEntry;

/// Repository for delivery log entries
pub trait DeliveryLogRepository {
    /// Create the `push_delivery_logs` table if it doesn't exist.
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Append one entry.
    fn append(&self, entry: &DeliveryLogEntry) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Entries recorded for a user, most recent first.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The recipient
    /// * `limit` - Maximum number of entries to return
    fn find_by_user(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<DeliveryLogEntry>, DbError>> + Send;
}
