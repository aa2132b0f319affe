//! Error type for the notification engine
//!
//! These errors stay inside a dispatch run. They are logged where they occur
//! and never returned to the code that triggered the notification.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// A persistence read or write failed
    #[error("Notification store error: {0}")]
    Store(String),

    /// The push gateway rejected or failed a delivery
    #[error("Push gateway error: {0}")]
    Gateway(String),

    /// The project an event refers to does not exist
    #[error("Project not found: {0}")]
    MissingProject(Uuid),

    /// A background delivery task panicked or was cancelled
    #[error("Delivery task failed: {0}")]
    Join(String),
}

impl NotifyError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        NotifyError::Store(err.to_string())
    }
}

impl From<tokio::task::JoinError> for NotifyError {
    fn from(err: tokio::task::JoinError) -> Self {
        NotifyError::Join(err.to_string())
    }
}
