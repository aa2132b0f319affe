// --- File: crates/services/echoboard_backend/src/routes.rs ---
use crate::app_state::AppState;
use axum::{extract::State, http::Uri, routing::get, Json, Router};
use echoboard_common::EchoboardError;
use serde::Serialize;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db_healthy: bool,
    pub push_enabled: bool,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, EchoboardError> {
    if !state.db.is_healthy().await {
        return Err(EchoboardError::DatabaseError(
            "database did not answer the health query".to_string(),
        ));
    }
    Ok(Json(HealthResponse {
        status: "ok",
        db_healthy: true,
        push_enabled: state.dispatcher.push_enabled(),
    }))
}

async fn not_found(uri: Uri) -> EchoboardError {
    EchoboardError::NotFoundError(format!("no route for {}", uri.path()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome to Echoboard API!" }))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use echoboard_config::{AppConfig, DatabaseConfig};
    use echoboard_db::DbClient;
    use echoboard_notify::{PushCapability, SqlNotificationStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn create_test_state() -> AppState {
        let config = Arc::new(AppConfig {
            database: Some(DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            }),
            ..Default::default()
        });
        let db = DbClient::new(&config).await.unwrap();
        let store = SqlNotificationStore::new(db.clone());
        store.init_schema().await.unwrap();
        AppState::with_store(config, db, store, PushCapability::Disabled)
    }

    #[tokio::test]
    async fn test_health_reports_database_and_push() {
        let app = router(create_test_state().await);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["db_healthy"], true);
        assert_eq!(json["push_enabled"], false);
    }

    #[tokio::test]
    async fn test_health_fails_with_error_body_when_database_is_down() {
        let state = create_test_state().await;
        state.db.pool().close().await;
        let app = router(state);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], 503);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = router(create_test_state().await);

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Not found: no route for /nope");
    }

    #[test]
    fn test_incomplete_apns_config_disables_push() {
        let config = AppConfig {
            use_apns: true,
            ..Default::default()
        };
        assert!(!crate::app_state::push_capability(&config).is_enabled());
    }
}
