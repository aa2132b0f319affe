// --- File: crates/echoboard_common/src/lib.rs ---

// Declare modules within this crate
pub mod models; // Shared entities
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod services; // Service abstractions
pub mod logging; // Logging utilities
pub mod features; // Runtime feature checks

// Re-export error types and utilities for easier access
pub use error::{config_error, external_service_error, EchoboardError, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::client::create_client;

// Re-export logging utilities for easier access
pub use logging::{init, init_from_config, init_with_level};

pub use features::{is_apns_enabled, is_feature_enabled};

pub use services::{BoxFuture, PushAlert, PushGateway, PushReceipt};
