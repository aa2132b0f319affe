//! Runtime configuration for Echoboard.
//!
//! Configuration is layered: `config/default.*`, then `config/{RUN_ENV}.*`, then
//! environment variables prefixed with `ECHOBOARD` (separator `__`). String values
//! equal to `secret_from_env` are finally replaced from secret environment variables.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Marker value that is replaced by a secret environment variable at load time.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Loads the application configuration from files and the environment.
///
/// The configuration directory defaults to `./config` and can be moved with
/// `ECHOBOARD_CONFIG_DIR`. Missing files are not an error; a missing `server`
/// section is.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("ECHOBOARD_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(env_vars::CONFIG_PREFIX)
                .separator(env_vars::CONFIG_SEPARATOR),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Applies environment overrides based on "secret_from_env" markers in the serialized config.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    env_vars::inject_env_vars(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// `DOTENV_OVERRIDE` names an alternative file; otherwise `.env` is used. The file
/// is read at most once per process. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_apns_secret_leaves_push_config_incomplete() {
        let config = AppConfig {
            use_apns: true,
            apns: Some(ApnsConfig {
                key_id: "KEY1234567".to_string(),
                team_id: "TEAM123456".to_string(),
                bundle_id: "com.example.unresolved".to_string(),
                key_base64: Some(SECRET_MARKER.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let loaded = apply_env_overrides_from_marker(config).unwrap();
        let apns = loaded.apns.unwrap();
        assert_eq!(apns.key_base64.as_deref(), Some(SECRET_MARKER));
        assert!(!apns.is_complete());
    }
}
