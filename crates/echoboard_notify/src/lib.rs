//! Push notification dispatch engine for Echoboard
//!
//! Given a domain event (new feedback, new comment, new vote, status change)
//! the engine works out who should hear about it, fans the alert out to every
//! active device of every recipient, classifies gateway failures, retires dead
//! device tokens and records every attempt in the delivery log.
//!
//! Dispatch is best effort. Entry points never return an error; the `spawn_*`
//! variants run in the background and the caller never waits on them.
//!
//! # Example
//!
//! ```rust,no_run
//! use echoboard_notify::{NotificationDispatcher, PushCapability, SqlNotificationStore};
//! use echoboard_apns::ApnsClient;
//! # async fn demo(db: echoboard_db::DbClient, config: echoboard_config::AppConfig) {
//! let store = SqlNotificationStore::new(db);
//! let dispatcher: NotificationDispatcher<_, ApnsClient> =
//!     NotificationDispatcher::new(store, PushCapability::Disabled, config.notifications.clone());
//! # }
//! ```

pub mod classifier;
pub mod content;
pub mod delivery_log;
pub mod dispatcher;
pub mod error;
pub mod fanout;
pub mod preferences;
pub mod recipients;
pub mod store;

pub use classifier::{classify, FailureKind};
pub use content::NotificationContent;
pub use delivery_log::{DeliveryContext, DeliveryLogger};
pub use dispatcher::{DispatchReport, NotificationDispatcher, PushCapability, RunStatus};
pub use error::NotifyError;
pub use preferences::should_notify;
pub use recipients::{resolve_recipients, RecipientResolver, RecipientSet};
pub use store::NotificationStore;

#[cfg(feature = "database")]
pub use store::SqlNotificationStore;
