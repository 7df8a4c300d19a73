//! Redfish sessions and request authentication.
//! Keep the public surface thin and split implementation across sub-modules.

mod basic;
mod classifier;
mod error;
mod gate;
mod principal;
mod reaper;
mod service;
mod session;
mod store;
mod token;

pub use basic::{parse_basic, AdminCredentials};
pub use classifier::{is_public, METADATA_PATH, ODATA_PATH, REDFISH_ROOT, SESSIONS_PATH, SESSION_SERVICE_PATH};
pub use error::SessionError;
pub use gate::{AuthGate, GateDecision, X_AUTH_TOKEN};
pub use principal::{AuthScheme, Principal};
pub use reaper::Reaper;
pub use service::{LoginRequest, LoginResponse, SessionService};
pub use session::{SessionRecord, SessionToken};
pub use store::{InMemorySessionStore, SessionStore};
pub use token::{SessionClaims, TokenSigner};
