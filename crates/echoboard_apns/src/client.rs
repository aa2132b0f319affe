//! APNs client module
//!
//! `ApnsClient` sends one alert to one device token per call. The provider
//! token is managed by [`ProviderTokenSigner`]; the HTTP client negotiates
//! HTTP/2 with the gateway over TLS.

use crate::auth::ProviderTokenSigner;
use crate::error::ApnsError;
use crate::models::{ApnsErrorBody, ApnsNotification};
use echoboard_common::http::client::{create_client, DEFAULT_TIMEOUT_SECS};
use echoboard_config::ApnsConfig;
use reqwest::{header, Client};
use tracing::{debug, warn};

/// Production gateway
pub const PRODUCTION_URL: &str = "https://api.push.apple.com";
/// Development gateway, for apps signed with a development profile
pub const SANDBOX_URL: &str = "https://api.sandbox.push.apple.com";

/// Client for the APNs provider API
pub struct ApnsClient {
    client: Client,
    signer: ProviderTokenSigner,
    topic: String,
    base_url: String,
}

impl ApnsClient {
    /// Creates a client from the APNs config section.
    ///
    /// `production` selects the production gateway; otherwise the sandbox is
    /// used.
    ///
    /// # Errors
    ///
    /// * `ApnsError::ConfigError` if the bundle id or key material is missing
    /// * `ApnsError::KeyError` if the signing key is unusable
    /// * `ApnsError::RequestError` if the HTTP client cannot be built
    pub fn new(config: &ApnsConfig) -> Result<Self, ApnsError> {
        if config.bundle_id.trim().is_empty() {
            return Err(ApnsError::ConfigError(
                "Missing bundle_id in ApnsConfig".to_string(),
            ));
        }

        let base_url = if config.production {
            PRODUCTION_URL
        } else {
            SANDBOX_URL
        };

        Ok(Self {
            client: create_client(DEFAULT_TIMEOUT_SECS, false)?,
            signer: ProviderTokenSigner::from_config(config)?,
            topic: config.bundle_id.clone(),
            base_url: base_url.to_string(),
        })
    }

    /// Points the client at a different gateway root, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one notification to one device.
    ///
    /// # Returns
    ///
    /// The `apns-id` APNs assigned to the notification, if it sent one back.
    ///
    /// # Errors
    ///
    /// `ApnsError::ApiError` when APNs rejects the request; its `reason` is the
    /// APNs reason string (`BadDeviceToken`, `Unregistered`, ...).
    pub async fn send_notification(
        &self,
        device_token: &str,
        notification: &ApnsNotification,
    ) -> Result<Option<String>, ApnsError> {
        let url = format!("{}/3/device/{}", self.base_url, device_token);
        let token = self.signer.token().await?;

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("bearer {}", token))
            .header("apns-topic", &self.topic)
            .header("apns-push-type", "alert")
            .header("apns-priority", "10")
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let apns_id = response
                .headers()
                .get("apns-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            debug!("APNs accepted notification {:?}", apns_id);
            return Ok(apns_id);
        }

        let body = response.text().await?;
        let reason = match serde_json::from_str::<ApnsErrorBody>(&body) {
            Ok(parsed) => parsed.reason,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
        };

        warn!("APNs rejected notification ({}): {}", status.as_u16(), reason);
        Err(ApnsError::ApiError {
            status: status.as_u16(),
            reason,
        })
    }
}
