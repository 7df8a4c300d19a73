//! Discovery documents, the SessionService resource and the health endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::identity::{REDFISH_ROOT, SESSIONS_PATH, SESSION_SERVICE_PATH};

pub const REDFISH_VERSION: &str = "1.19.0";

const METADATA_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:Reference Uri="http://redfish.dmtf.org/schemas/v1/ServiceRoot_v1.xml">
    <edmx:Include Namespace="ServiceRoot"/>
    <edmx:Include Namespace="ServiceRoot.v1_19_0"/>
  </edmx:Reference>
  <edmx:Reference Uri="http://redfish.dmtf.org/schemas/v1/SessionService_v1.xml">
    <edmx:Include Namespace="SessionService"/>
    <edmx:Include Namespace="SessionService.v1_2_0"/>
  </edmx:Reference>
  <edmx:Reference Uri="http://redfish.dmtf.org/schemas/v1/Session_v1.xml">
    <edmx:Include Namespace="Session"/>
    <edmx:Include Namespace="Session.v1_8_0"/>
  </edmx:Reference>
  <edmx:Reference Uri="http://redfish.dmtf.org/schemas/v1/SessionCollection_v1.xml">
    <edmx:Include Namespace="SessionCollection"/>
  </edmx:Reference>
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="Service">
      <EntityContainer Name="Service" Extends="ServiceRoot.v1_19_0.ServiceContainer"/>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>
"#;

pub async fn service_root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "@odata.context": "/redfish/v1/$metadata#ServiceRoot.ServiceRoot",
        "@odata.id": REDFISH_ROOT,
        "@odata.type": "#ServiceRoot.v1_19_0.ServiceRoot",
        "Id": "RootService",
        "Name": "Root Service",
        "RedfishVersion": REDFISH_VERSION,
        "UUID": state.service_uuid,
        "Product": "Redfish Gateway",
        "SessionService": { "@odata.id": SESSION_SERVICE_PATH },
        "Links": { "Sessions": { "@odata.id": SESSIONS_PATH } },
    }))
}

pub async fn metadata() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/xml")], METADATA_XML)
}

pub async fn odata() -> Json<serde_json::Value> {
    Json(json!({
        "@odata.context": "/redfish/v1/$metadata",
        "value": [
            { "name": "Service", "kind": "Singleton", "url": REDFISH_ROOT },
            { "name": "SessionService", "kind": "Singleton", "url": SESSION_SERVICE_PATH },
            { "name": "Sessions", "kind": "EntitySet", "url": SESSIONS_PATH },
        ],
    }))
}

fn session_service_body(state: &AppState) -> serde_json::Value {
    json!({
        "@odata.context": "/redfish/v1/$metadata#SessionService.SessionService",
        "@odata.id": SESSION_SERVICE_PATH,
        "@odata.type": "#SessionService.v1_2_0.SessionService",
        "Id": "SessionService",
        "Name": "Session Service",
        "Description": "Session Service for the Redfish API",
        "Status": { "State": "Enabled", "Health": "OK" },
        "ServiceEnabled": true,
        "SessionTimeout": state.sessions.session_timeout_secs(),
        "Sessions": { "@odata.id": SESSIONS_PATH },
    })
}

pub async fn session_service(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(session_service_body(&state))
}

/// PATCH and PUT accept any JSON object and answer with the current resource.
/// No property is writable yet, so the body is only checked for shape.
pub async fn update_session_service(State(state): State<AppState>, body: Bytes) -> AppResult<Json<serde_json::Value>> {
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&body).map_err(|_| AppError::malformed_json())?;
    Ok(Json(session_service_body(&state)))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.session_count().ok();
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": sessions,
        "reaper_running": state.store.reaper_running(),
    }))
}
