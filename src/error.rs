//! Unified application error model and mapping helpers.
//! Every HTTP failure in the gateway is an `AppError`; it knows its status code and
//! renders itself as a Redfish error body (`Base` message registry shape).

use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{Display, Formatter};

use crate::identity::SessionError;

pub const BASE_REGISTRY: &str = "Base.1.22.0";
pub const ODATA_VERSION: &str = "odata-version";

pub const SESSION_CONFLICT_MESSAGE: &str =
    "A session already exists for this user. Delete the existing session before creating a new one.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    Auth { code: String, message: String },
    NotFound { code: String, message: String },
    MethodNotAllowed { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    /// Registry message key (e.g. `ResourceMissing`).
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Auth { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::MethodNotAllowed { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Auth { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::MethodNotAllowed { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn method_not_allowed<S: Into<String>>(code: S, msg: S) -> Self { AppError::MethodNotAllowed { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// The single rejection every failed credential check collapses into.
    pub fn unauthorized() -> Self { Self::auth("InsufficientPrivilege", "Unauthorized access") }

    pub fn session_conflict() -> Self { Self::conflict("ResourceInUse", SESSION_CONFLICT_MESSAGE) }

    pub fn resource_missing(resource: &str) -> Self {
        Self::not_found("ResourceMissing".to_string(), format!("{} not found", resource))
    }

    pub fn malformed_json() -> Self {
        Self::user("MalformedJSON", "The request body submitted was malformed JSON and could not be parsed by the receiving service.")
    }

    pub fn property_missing(property: &str) -> Self {
        Self::user("PropertyMissing".to_string(), format!("Missing or empty {}", property))
    }

    pub fn method_not_allowed_default() -> Self {
        Self::method_not_allowed("MethodNotAllowed", "The HTTP method is not allowed on this resource.")
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Auth { .. } => 401,
            AppError::NotFound { .. } => 404,
            AppError::MethodNotAllowed { .. } => 405,
            AppError::Conflict { .. } => 409,
            AppError::Internal { .. } => 500,
        }
    }

    fn severity(&self) -> &'static str {
        match self {
            AppError::Internal { .. } | AppError::Auth { .. } => "Critical",
            _ => "Warning",
        }
    }

    fn resolution(&self) -> &'static str {
        match self.code_str() {
            "InsufficientPrivilege" => "Either abandon the operation or change the associated access rights and resubmit the request if the operation failed.",
            "ResourceMissing" => "Provide a valid resource identifier and resubmit the request.",
            "ResourceInUse" => "Remove the condition and resubmit the request if the operation failed.",
            "MethodNotAllowed" => "None.",
            "MalformedJSON" => "Ensure that the request body is valid JSON and resubmit the request.",
            "PropertyMissing" => "Ensure that the property is in the request body and has a valid value and resubmit the request if the operation failed.",
            "InternalError" => "Resubmit the request. If the problem persists, consider resetting the service.",
            _ => "None.",
        }
    }

    /// Redfish error body for this error.
    pub fn redfish_body(&self) -> serde_json::Value {
        let message_id = format!("{}.{}", BASE_REGISTRY, self.code_str());
        json!({
            "error": {
                "code": format!("{}.GeneralError", BASE_REGISTRY),
                "message": self.message(),
                "@Message.ExtendedInfo": [{
                    "MessageId": message_id,
                    "Message": self.message(),
                    "Severity": self.severity(),
                    "Resolution": self.resolution(),
                }]
            }
        })
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "InternalError".into(), message: err.to_string() }
    }
}

/// Handler-side mapping. Expired sessions read as missing; the gate never uses this
/// and collapses everything into `unauthorized()` instead.
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials | SessionError::InvalidToken => AppError::unauthorized(),
            SessionError::AlreadyExists => AppError::session_conflict(),
            SessionError::NotFound | SessionError::Expired => AppError::resource_missing("Session"),
            SessionError::Signing(m) | SessionError::Storage(m) => AppError::internal("InternalError".to_string(), m),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if let AppError::Internal { message, .. } = &self {
            tracing::error!(error = %message, "internal error");
        }
        let mut resp = (status, Json(self.redfish_body())).into_response();
        let headers = resp.headers_mut();
        headers.insert(ODATA_VERSION, HeaderValue::from_static("4.0"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        resp
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
