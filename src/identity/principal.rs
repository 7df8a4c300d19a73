use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthScheme {
    SessionToken,
    Basic,
}

/// Identity attached to a request once the gate has let it through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub scheme: AuthScheme,
}

impl Principal {
    pub fn from_session(username: String, session_id: String) -> Self {
        Self { username, session_id: Some(session_id), scheme: AuthScheme::SessionToken }
    }

    pub fn basic(username: String) -> Self {
        Self { username, session_id: None, scheme: AuthScheme::Basic }
    }
}
