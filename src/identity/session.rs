use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

pub type SessionToken = String;

/// One authenticated login. Only `last_access_at` (touch) and `active` ever change
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub username: String,
    pub token: SessionToken,
    pub created_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub timeout_seconds: u64,
    pub client_address: String,
    pub user_agent: String,
    pub active: bool,
}

impl SessionRecord {
    pub fn new(
        id: String,
        username: String,
        token: SessionToken,
        timeout_seconds: u64,
        client_address: String,
        user_agent: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            token,
            created_at: now,
            last_access_at: now,
            timeout_seconds,
            client_address,
            user_agent,
            active: true,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.timeout_seconds).unwrap_or(i64::MAX);
        let timeout = ChronoDuration::try_seconds(secs).unwrap_or(ChronoDuration::MAX);
        self.last_access_at.checked_add_signed(timeout).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Inactive records count as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.active || now > self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Bump `last_access_at`. Never moves it backwards even if the wall clock does.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.last_access_at {
            self.last_access_at = now;
        }
    }

    pub fn invalidate(&mut self) {
        self.active = false;
    }
}
