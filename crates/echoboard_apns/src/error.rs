//! Error type for the APNs client

use thiserror::Error;

/// Errors that can occur when talking to APNs
#[derive(Error, Debug)]
pub enum ApnsError {
    /// The provider token could not be produced
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to APNs
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing or invalid configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// The signing key could not be read or decoded
    #[error("Signing key error: {0}")]
    KeyError(String),

    /// APNs rejected the notification. `reason` is the APNs reason string,
    /// e.g. `BadDeviceToken` or `Unregistered`.
    #[error("APNs API error ({status}): {reason}")]
    ApiError { status: u16, reason: String },
}

impl ApnsError {
    /// The APNs reason string, for rejections reported by the gateway.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ApnsError::ApiError { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<ApnsError> for echoboard_common::EchoboardError {
    fn from(err: ApnsError) -> Self {
        echoboard_common::external_service_error("apns", err)
    }
}
