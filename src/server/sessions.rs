//! `/redfish/v1/SessionService/Sessions` handlers.

use std::net::SocketAddr;

use axum::body::to_bytes;
use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::header::{LOCATION, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::middleware::RequestId;
use super::AppState;
use crate::error::{AppError, AppResult};
use crate::identity::{LoginRequest, SessionRecord, SESSIONS_PATH, X_AUTH_TOKEN};

/// Upper bound on a login body; anything larger is treated as malformed.
const MAX_LOGIN_BODY: usize = 64 * 1024;

const SESSION_ODATA_CONTEXT: &str = "/redfish/v1/$metadata#Session.Session";
const SESSION_ODATA_TYPE: &str = "#Session.v1_8_0.Session";
const SESSION_NAME: &str = "User Session";

#[derive(Debug, Deserialize)]
struct CreateSessionBody {
    #[serde(rename = "UserName")]
    user_name: Option<String>,
    #[serde(rename = "Password")]
    password: Option<String>,
}

/// Session resource as rendered to clients. `Password` and `Token` are always null.
#[derive(Debug, Serialize)]
pub struct SessionResource {
    #[serde(rename = "@odata.context")]
    pub odata_context: &'static str,
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: &'static str,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "SessionType")]
    pub session_type: &'static str,
    #[serde(rename = "CreatedTime")]
    pub created_time: String,
    #[serde(rename = "ClientOriginIPAddress")]
    pub client_origin_ip_address: String,
    #[serde(rename = "Password")]
    pub password: Option<String>,
    #[serde(rename = "Token")]
    pub token: Option<String>,
}

pub fn session_uri(id: &str) -> String {
    format!("{}/{}", SESSIONS_PATH, id)
}

impl From<&SessionRecord> for SessionResource {
    fn from(s: &SessionRecord) -> Self {
        Self {
            odata_context: SESSION_ODATA_CONTEXT,
            odata_id: session_uri(&s.id),
            odata_type: SESSION_ODATA_TYPE,
            id: s.id.clone(),
            name: SESSION_NAME,
            description: format!("{} for {}", SESSION_NAME, s.username),
            user_name: s.username.clone(),
            session_type: "Redfish",
            created_time: s.created_at.to_rfc3339(),
            client_origin_ip_address: s.client_address.clone(),
            password: None,
            token: None,
        }
    }
}

/// First hop of `X-Forwarded-For`, then `X-Real-IP`, then the peer address.
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|s| !s.is_empty());
    if let Some(first) = header("x-forwarded-for").and_then(|v| v.split(',').next()).map(str::trim) {
        if !first.is_empty() {
            return first.to_string();
        }
    }
    if let Some(ip) = header("x-real-ip") {
        return ip.to_string();
    }
    peer.map(|a| a.ip().to_string()).unwrap_or_default()
}

fn parse_login(bytes: &[u8]) -> AppResult<(String, String)> {
    let body: CreateSessionBody = serde_json::from_slice(bytes).map_err(|_| AppError::malformed_json())?;
    let user = body.user_name.filter(|u| !u.is_empty()).ok_or_else(|| AppError::property_missing("UserName"))?;
    let pass = body.password.filter(|p| !p.is_empty()).ok_or_else(|| AppError::property_missing("Password"))?;
    Ok((user, pass))
}

pub async fn create_session(State(state): State<AppState>, req: Request) -> AppResult<Response> {
    let (parts, body) = req.into_parts();
    let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|c| c.0);
    let request_id = parts.extensions.get::<RequestId>().map(|r| r.0.clone()).unwrap_or_default();
    let bytes = to_bytes(body, MAX_LOGIN_BODY).await.map_err(|_| AppError::malformed_json())?;
    let (username, password) = parse_login(&bytes)?;

    let login = LoginRequest {
        username,
        password,
        client_address: client_address(&parts.headers, peer),
        user_agent: parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };
    let created = state.sessions.create_session(&login).map_err(|e| {
        tracing::info!(request_id = %request_id, user = %login.username, reason = %e, "login refused");
        AppError::from(e)
    })?;

    let location = session_uri(&created.session.id);
    let mut resp = (StatusCode::CREATED, Json(SessionResource::from(&created.session))).into_response();
    let headers = resp.headers_mut();
    headers.insert(
        X_AUTH_TOKEN,
        HeaderValue::from_str(&created.token).map_err(|e| AppError::internal("InternalError".to_string(), e.to_string()))?,
    );
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&location).map_err(|e| AppError::internal("InternalError".to_string(), e.to_string()))?,
    );
    Ok(resp)
}

pub async fn list_sessions(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let sessions = state.sessions.list_sessions()?;
    let members: Vec<_> = sessions.iter().map(|s| json!({ "@odata.id": session_uri(&s.id) })).collect();
    Ok(Json(json!({
        "@odata.context": "/redfish/v1/$metadata#SessionCollection.SessionCollection",
        "@odata.id": SESSIONS_PATH,
        "@odata.type": "#SessionCollection.SessionCollection",
        "Name": "Session Collection",
        "Members@odata.count": members.len(),
        "Members": members,
    })))
}

pub async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<SessionResource>> {
    let session = state.sessions.get_session(&id)?;
    Ok(Json(SessionResource::from(&session)))
}

pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.sessions.delete_session(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
