//! Delivery logging
//!
//! Every device delivery attempt produces one log entry. A failed log write
//! is reported to the process log and otherwise ignored: delivery outcome
//! matters more than audit completeness.

use crate::store::NotificationStore;
use chrono::Utc;
use echoboard_common::models::{DeliveryLogEntry, DeliveryOutcome, NotificationType};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Fields shared by every entry of one dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryContext {
    pub notification_type: NotificationType,
    pub feedback_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

pub struct DeliveryLogger<S> {
    store: Arc<S>,
}

impl<S> Clone for DeliveryLogger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: NotificationStore> DeliveryLogger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append an entry. Returns `false` if the write failed.
    pub async fn record(
        &self,
        context: &DeliveryContext,
        user_id: Uuid,
        device_id: Option<Uuid>,
        outcome: DeliveryOutcome,
        error_message: Option<String>,
    ) -> bool {
        let entry = DeliveryLogEntry {
            id: Uuid::new_v4(),
            user_id,
            device_token_id: device_id,
            notification_type: context.notification_type,
            outcome,
            error_message,
            feedback_id: context.feedback_id,
            project_id: context.project_id,
            created_at: Utc::now(),
        };

        match self.store.record_delivery(&entry).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to record {} delivery for user {}: {}",
                    outcome, user_id, e
                );
                false
            }
        }
    }
}
