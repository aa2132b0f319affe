// --- File: crates/echoboard_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! The notification engine talks to the push gateway only through [`PushGateway`],
//! which keeps it independent of the concrete transport and lets tests swap in a
//! scripted gateway.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A single alert addressed to one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushAlert {
    /// Title line shown by the device.
    pub title: String,
    /// Body text shown by the device.
    pub body: String,
    /// Structured custom data delivered alongside the alert.
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// What the gateway reported back for an accepted alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
    /// Gateway-assigned message id, when the gateway provides one.
    pub id: Option<String>,
}

/// A trait for push gateway operations.
///
/// One call delivers one alert to one device token. Failures are reported
/// through `Self::Error`, whose `Display` output must carry the gateway's
/// failure reason so callers can tell dead tokens from transient errors.
pub trait PushGateway: Send + Sync {
    /// Error type returned by gateway operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one alert to one device token.
    fn send<'a>(
        &'a self,
        device_token: &'a str,
        alert: &'a PushAlert,
    ) -> BoxFuture<'a, PushReceipt, Self::Error>;
}
