//! Request id, Redfish headers and the authentication gate glue.

use axum::extract::{Request, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::AppState;
use crate::error::ODATA_VERSION;
use crate::identity::{GateDecision, REDFISH_ROOT};

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(RequestId(id.clone()));
    let mut resp = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }
    resp
}

/// `OData-Version` and `Cache-Control` on every response under `/redfish/v1`.
pub async fn redfish_headers(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let redfish = path == REDFISH_ROOT || path.starts_with("/redfish/v1/");
    let mut resp = next.run(req).await;
    if redfish {
        let headers = resp.headers_mut();
        headers.entry(ODATA_VERSION).or_insert(HeaderValue::from_static("4.0"));
        headers.entry(CACHE_CONTROL).or_insert(HeaderValue::from_static("no-cache"));
    }
    resp
}

/// Let public requests through, attach the `Principal` to authenticated ones,
/// answer everything else with the uniform 401.
pub async fn auth_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let decision = state.gate.check(req.method(), req.uri().path(), req.headers());
    match decision {
        Ok(GateDecision::Public) => next.run(req).await,
        Ok(GateDecision::Authenticated(principal)) => {
            tracing::debug!(user = %principal.username, scheme = ?principal.scheme, path = %req.uri().path(), "auth.allow");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::info!(method = %req.method(), path = %req.uri().path(), "unauthorized request");
            e.into_response()
        }
    }
}
