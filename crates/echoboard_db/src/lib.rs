//! Database integration for Echoboard
//!
//! This crate provides the persistence side of the notification engine: a
//! pooled `DbClient` over SQLx's `Any` driver and repositories for the
//! notification audience, device tokens and the delivery log.
//!
//! # Example
//!
//! ```rust,no_run
//! use echoboard_db::{DbClient, DeviceTokenRepository, SqlDeviceTokenRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = DbClient::from_url("sqlite://data/echoboard.db").await?;
//!     let tokens = SqlDeviceTokenRepository::new(db);
//!     tokens.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use repository::RepositoryFactory;

pub use repositories::{
    AudienceRepository, DeliveryLogRepository, DeviceTokenRepository, SqlAudienceRepository,
    SqlDeliveryLogRepository, SqlDeviceTokenRepository, SqlRepositoryFactory,
};
