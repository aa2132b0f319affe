//! Apple Push Notification service integration for Echoboard
//!
//! This crate sends alert notifications to iOS devices through the APNs
//! HTTP/2 provider API.
//!
//! # Features
//!
//! - Token-based provider authentication (ES256 JWT, cached and reused)
//! - Production and sandbox endpoints
//! - Alert payloads with custom data keys
//! - Gateway failures carry the APNs `reason` so callers can detect dead tokens
//! - Implements [`echoboard_common::PushGateway`]
//!
//! # Example
//!
//! ```rust,no_run
//! use echoboard_apns::ApnsClient;
//! use echoboard_common::{PushAlert, PushGateway};
//! use echoboard_config::ApnsConfig;
//!
//! async fn send(config: &ApnsConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApnsClient::new(config)?;
//!     let alert = PushAlert {
//!         title: "Status updated".to_string(),
//!         body: "\"Dark mode\" moved from Pending to Completed".to_string(),
//!         payload: serde_json::Map::new(),
//!     };
//!     client.send("a1b2c3...", &alert).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod service;

pub use auth::ProviderTokenSigner;
pub use client::{ApnsClient, PRODUCTION_URL, SANDBOX_URL};
pub use error::ApnsError;
