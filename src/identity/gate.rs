//! Per-request authentication decision.
//!
//! Order: classifier, then `X-Auth-Token`, then HTTP Basic. A token that is
//! present but fails is final; Basic credentials on the same request are never
//! looked at. Every rejection is the same 401.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method};
use tracing::debug;

use super::basic::{parse_basic, AdminCredentials};
use super::classifier::is_public;
use super::principal::Principal;
use super::service::SessionService;
use crate::error::AppError;

pub const X_AUTH_TOKEN: &str = "X-Auth-Token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Public,
    Authenticated(Principal),
}

enum TokenHeader<'a> {
    Absent,
    Present(&'a str),
    Unreadable,
}

fn token_header(headers: &HeaderMap) -> TokenHeader<'_> {
    let Some(raw) = headers.get(X_AUTH_TOKEN) else { return TokenHeader::Absent; };
    match raw.to_str() {
        Ok(s) if s.trim().is_empty() => TokenHeader::Absent,
        Ok(s) => TokenHeader::Present(s.trim()),
        Err(_) => TokenHeader::Unreadable,
    }
}

pub struct AuthGate {
    sessions: Arc<SessionService>,
    admin: AdminCredentials,
}

impl AuthGate {
    pub fn new(sessions: Arc<SessionService>, admin: AdminCredentials) -> Self {
        Self { sessions, admin }
    }

    pub fn check(&self, method: &Method, path: &str, headers: &HeaderMap) -> Result<GateDecision, AppError> {
        if is_public(path, method) {
            return Ok(GateDecision::Public);
        }
        let principal = match token_header(headers) {
            TokenHeader::Present(token) => self.check_token(token)?,
            TokenHeader::Unreadable => {
                debug!(%method, path, "auth.reject: unreadable token header");
                return Err(AppError::unauthorized());
            }
            TokenHeader::Absent => self.check_basic(headers)?,
        };
        Ok(GateDecision::Authenticated(principal))
    }

    fn check_token(&self, token: &str) -> Result<Principal, AppError> {
        match self.sessions.validate_token(token) {
            Ok(session) => Ok(Principal::from_session(session.username, session.id)),
            Err(e) => {
                debug!(reason = %e, "auth.reject: token");
                Err(AppError::unauthorized())
            }
        }
    }

    fn check_basic(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let creds = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic);
        let Some((username, password)) = creds else {
            debug!("auth.reject: missing or malformed basic credentials");
            return Err(AppError::unauthorized());
        };
        if !self.admin.matches(&username, &password) {
            debug!("auth.reject: basic credentials mismatch");
            return Err(AppError::unauthorized());
        }
        Ok(Principal::basic(username))
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
