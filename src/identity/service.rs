use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::basic::AdminCredentials;
use super::error::SessionError;
use super::session::{SessionRecord, SessionToken};
use super::store::SessionStore;
use super::token::TokenSigner;
use crate::config::AuthConfig;

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub client_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: SessionRecord,
    /// The only place the raw token is ever handed out.
    pub token: SessionToken,
}

/// Session lifecycle on top of a `SessionStore`.
///
/// One active session per user: a second login is refused with `AlreadyExists`
/// rather than evicting the first. The check and the insert are separate store
/// calls, so two logins racing for the same user can both succeed.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    signer: TokenSigner,
    admin: AdminCredentials,
    session_timeout: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, signer: TokenSigner, admin: AdminCredentials, session_timeout: Duration) -> Self {
        Self { store, signer, admin, session_timeout }
    }

    pub fn from_config(store: Arc<dyn SessionStore>, auth: &AuthConfig) -> Self {
        let signer = TokenSigner::new(auth.jwt_key.as_bytes(), auth.jwt_expiration(), auth.session_timeout());
        let admin = AdminCredentials::new(auth.admin_username.clone(), auth.admin_password.clone());
        Self::new(store, signer, admin, auth.session_timeout())
    }

    pub fn session_timeout_secs(&self) -> u64 { self.session_timeout.as_secs() }

    pub fn create_session(&self, req: &LoginRequest) -> Result<LoginResponse, SessionError> {
        if !self.admin.matches(&req.username, &req.password) {
            return Err(SessionError::InvalidCredentials);
        }

        let existing = self.store.list()?;
        if existing.iter().any(|s| s.username == req.username && s.active) {
            return Err(SessionError::AlreadyExists);
        }

        let session_id = Uuid::new_v4().to_string();
        let token = self.signer.issue(&req.username, &session_id)?;
        let session = SessionRecord::new(
            session_id,
            req.username.clone(),
            token.clone(),
            self.session_timeout.as_secs(),
            req.client_address.clone(),
            req.user_agent.clone(),
        );
        self.store.create(session.clone())?;
        tracing::info!(user = %session.username, sid = %session.id, client = %session.client_address, "session created");
        Ok(LoginResponse { session, token })
    }

    /// Verify the token, resolve its session and touch it.
    pub fn validate_token(&self, token: &str) -> Result<SessionRecord, SessionError> {
        let claims = self.signer.verify(token)?;
        let mut session = self.store.get_by_token(token)?;
        if session.id != claims.jti || session.username != claims.sub {
            return Err(SessionError::InvalidToken);
        }
        session.touch();
        self.store.update(session.clone())?;
        tracing::trace!(user = %session.username, sid = %session.id, "session touched");
        Ok(session)
    }

    pub fn get_session(&self, id: &str) -> Result<SessionRecord, SessionError> {
        self.store.get(id)
    }

    pub fn delete_session(&self, id: &str) -> Result<(), SessionError> {
        self.store.delete(id)?;
        tracing::info!(sid = %id, "session deleted");
        Ok(())
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionRecord>, SessionError> {
        self.store.list()
    }

    pub fn session_count(&self) -> Result<usize, SessionError> {
        Ok(self.store.list()?.len())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
