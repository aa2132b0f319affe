// --- File: crates/echoboard_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. loaded via ECHOBOARD__DATABASE__URL
}

// --- APNs Config ---
// Holds the push gateway identity. The signing key itself is either read from
// `key_path` or taken from `key_base64` (usually "secret_from_env").
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApnsConfig {
    pub key_id: String,
    pub team_id: String,
    pub bundle_id: String, // Used as the apns-topic header
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default)]
    pub key_base64: Option<String>, // Secret loaded from env var: ECHOBOARD_SECRET_APNS_KEY_BASE64
    #[serde(default)]
    pub production: bool, // false selects the sandbox gateway
}

impl ApnsConfig {
    /// Returns `true` when every identity field is present and some key material is configured.
    pub fn is_complete(&self) -> bool {
        let has_key = self.key_path.as_deref().is_some_and(|p| !p.trim().is_empty())
            || self
                .key_base64
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty() && k != crate::SECRET_MARKER);

        !self.key_id.trim().is_empty()
            && !self.team_id.trim().is_empty()
            && !self.bundle_id.trim().is_empty()
            && has_key
    }
}

// --- Notification Dispatch Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_deep_link_scheme")]
    pub deep_link_scheme: String,
    #[serde(default = "default_max_concurrent_recipients")]
    pub max_concurrent_recipients: usize,
}

fn default_deep_link_scheme() -> String {
    "echoboard".to_string()
}

fn default_max_concurrent_recipients() -> usize {
    8
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            deep_link_scheme: default_deep_link_scheme(),
            max_concurrent_recipients: default_max_concurrent_recipients(),
        }
    }
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub directory: Option<String>, // Daily rolling file output when set
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_apns: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub apns: Option<ApnsConfig>,

    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
