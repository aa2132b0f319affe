// --- File: crates/echoboard_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// Errors that reach the HTTP surface of the backend.
///
/// Crate errors convert into this type at the service boundary:
/// `DbError` becomes `DatabaseError` (or `NotFoundError`/`ConfigError`),
/// `ApnsError` becomes `ExternalServiceError`.
#[derive(Error, Debug)]
pub enum EchoboardError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The database could not be reached or refused a query
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFoundError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for EchoboardError {
    fn status_code(&self) -> u16 {
        match self {
            EchoboardError::ConfigError(_) => 500,
            EchoboardError::DatabaseError(_) => 503,
            EchoboardError::ExternalServiceError { .. } => 502,
            EchoboardError::NotFoundError(_) => 404,
        }
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> EchoboardError {
    EchoboardError::ConfigError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> EchoboardError {
    EchoboardError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(config_error("missing server section").status_code(), 500);
        assert_eq!(
            EchoboardError::DatabaseError("pool closed".into()).status_code(),
            503
        );
        assert_eq!(external_service_error("apns", "bad key").status_code(), 502);
        assert_eq!(EchoboardError::NotFoundError("/nope".into()).status_code(), 404);
    }

    #[test]
    fn external_service_error_names_the_service() {
        let err = external_service_error("apns", "connection reset");
        assert_eq!(
            err.to_string(),
            "External service error: apns - connection reset"
        );
    }
}
