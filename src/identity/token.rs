//! Signed session tokens (HS256 JWT).
//!
//! The token carries the username (`sub`) and the session id (`jti`); the session
//! store remains the authority on whether the session is still alive.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::SessionError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Username.
    pub sub: String,
    /// Session id.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenSigner {
    /// `lifetime` is raised to `session_timeout` so a token never dies before its session.
    pub fn new(secret: &[u8], lifetime: Duration, session_timeout: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime: lifetime.max(session_timeout),
        }
    }

    pub fn lifetime(&self) -> Duration { self.lifetime }

    pub fn issue(&self, username: &str, session_id: &str) -> Result<String, SessionError> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            sub: username.to_string(),
            jti: session_id.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Check signature, algorithm and `exp`. Any failure is `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                crate::tprintln!("token.verify failed: {}", e);
                SessionError::InvalidToken
            })
    }
}
