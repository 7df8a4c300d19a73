//!
//! Redfish HTTP server
//! -------------------
//! Axum router for the `/redfish/v1` namespace.
//!
//! Responsibilities:
//! - Session service endpoints (login, list, inspect, logout).
//! - Discovery documents (service root, `$metadata`, OData service document).
//! - Authentication gate in front of every protected route, unless disabled in config.
//! - Request ids, Redfish response headers and Redfish error bodies on every response.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{Method, Uri};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::identity::{
    AdminCredentials, AuthGate, InMemorySessionStore, SessionService, SessionStore, METADATA_PATH, ODATA_PATH,
    REDFISH_ROOT, SESSIONS_PATH, SESSION_SERVICE_PATH,
};

pub mod middleware;
pub mod service_root;
pub mod sessions;

/// Shared server state injected into all handlers.
///
/// Built once per process (or per test) by `build_state`; there is no global session state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub gate: Arc<AuthGate>,
    /// Concrete store handle, kept for shutdown.
    pub store: Arc<InMemorySessionStore>,
    pub config: Arc<Config>,
    /// Reported as `UUID` in the service root.
    pub service_uuid: String,
}

pub fn build_state(config: &Config) -> AppState {
    let store = Arc::new(InMemorySessionStore::new(config.auth.cleanup_interval()));
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let sessions = Arc::new(SessionService::from_config(dyn_store, &config.auth));
    let admin = AdminCredentials::new(config.auth.admin_username.clone(), config.auth.admin_password.clone());
    let gate = Arc::new(AuthGate::new(sessions.clone(), admin));
    AppState {
        sessions,
        gate,
        store,
        config: Arc::new(config.clone()),
        service_uuid: Uuid::new_v4().to_string(),
    }
}

pub fn build_router(state: AppState) -> Router {
    let session_item = format!("{}/{{id}}", SESSIONS_PATH);
    let sessions_slash = format!("{}/", SESSIONS_PATH);
    let root_slash = format!("{}/", REDFISH_ROOT);

    let mut router = Router::new()
        .route(REDFISH_ROOT, get(service_root::service_root))
        .route(&root_slash, get(service_root::service_root))
        .route(METADATA_PATH, get(service_root::metadata))
        .route(ODATA_PATH, get(service_root::odata))
        .route(
            SESSION_SERVICE_PATH,
            get(service_root::session_service)
                .patch(service_root::update_session_service)
                .put(service_root::update_session_service),
        )
        .route(SESSIONS_PATH, get(sessions::list_sessions).post(sessions::create_session))
        .route(&sessions_slash, get(sessions::list_sessions).post(sessions::create_session))
        .route(&session_item, get(sessions::get_session).delete(sessions::delete_session))
        .route("/health", get(service_root::health))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed);

    if state.config.server.auth_required {
        router = router.layer(from_fn_with_state(state.clone(), middleware::auth_gate));
    } else {
        tracing::warn!("authentication disabled: every endpoint is public");
    }

    router
        .layer(from_fn(middleware::redfish_headers))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_id))
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::resource_missing(uri.path())
}

async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    tracing::debug!(%method, path = %uri.path(), "method not allowed");
    AppError::method_not_allowed_default()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Bind, serve until Ctrl-C, then stop the session reaper.
pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config);
    let store = state.store.clone();
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.http_port))?;
    info!(
        %addr,
        auth_required = config.server.auth_required,
        session_timeout_secs = config.auth.session_timeout_secs,
        cleanup_interval_secs = config.auth.cleanup_interval_secs,
        "Starting Redfish server"
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.stop();
    info!("Redfish server stopped");
    Ok(())
}
