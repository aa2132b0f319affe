// --- File: crates/services/echoboard_backend/src/app_state.rs ---
use echoboard_apns::ApnsClient;
use echoboard_common::{is_apns_enabled, EchoboardError};
use echoboard_config::AppConfig;
use echoboard_db::DbClient;
use echoboard_notify::{NotificationDispatcher, PushCapability, SqlNotificationStore};
use std::sync::Arc;
use tracing::{info, warn};

/// The dispatcher type the backend runs with.
pub type Dispatcher = NotificationDispatcher<SqlNotificationStore, ApnsClient>;

/// Application state that is shared across all routes.
///
/// Handlers that commit a feedback, comment, vote or status change call the
/// matching `spawn_*` method of `dispatcher` after the write succeeds.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Connect the database, create the schema and build the dispatcher.
    ///
    /// An APNs section that cannot be turned into a client disables push
    /// instead of failing startup.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, EchoboardError> {
        let db = DbClient::new(&config).await?;
        let store = SqlNotificationStore::new(db.clone());
        store.init_schema().await?;

        Ok(Self::with_store(config.clone(), db, store, push_capability(&config)))
    }

    pub fn with_store(
        config: Arc<AppConfig>,
        db: DbClient,
        store: SqlNotificationStore,
        push: PushCapability<ApnsClient>,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(store, push, config.notifications.clone());
        Self {
            config,
            db,
            dispatcher,
        }
    }
}

/// Decide once whether this process can send push notifications.
pub fn push_capability(config: &AppConfig) -> PushCapability<ApnsClient> {
    if !is_apns_enabled(config) {
        return PushCapability::Disabled;
    }
    let Some(apns_config) = config.apns.as_ref() else {
        return PushCapability::Disabled;
    };

    match ApnsClient::new(apns_config) {
        Ok(client) => {
            info!("APNs client ready for {}", client.base_url());
            PushCapability::enabled(client)
        }
        Err(e) => {
            warn!("Push disabled: {}", EchoboardError::from(e));
            PushCapability::Disabled
        }
    }
}
