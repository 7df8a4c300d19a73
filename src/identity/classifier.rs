//! Which requests need credentials at all.

use axum::http::Method;

pub const REDFISH_ROOT: &str = "/redfish/v1";
pub const METADATA_PATH: &str = "/redfish/v1/$metadata";
pub const ODATA_PATH: &str = "/redfish/v1/odata";
pub const SESSION_SERVICE_PATH: &str = "/redfish/v1/SessionService";
pub const SESSIONS_PATH: &str = "/redfish/v1/SessionService/Sessions";

fn in_namespace(path: &str) -> bool {
    path == REDFISH_ROOT || path.starts_with("/redfish/v1/")
}

/// Decide whether `method path` may proceed without credentials.
///
/// Discovery documents are always public; the session collection is public for
/// `POST` only (logging in); anything else under `/redfish/v1` is protected.
/// Paths outside the namespace are not gated.
pub fn is_public(path: &str, method: &Method) -> bool {
    if !in_namespace(path) {
        return true;
    }
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed {
        REDFISH_ROOT | METADATA_PATH | ODATA_PATH => true,
        SESSIONS_PATH => *method == Method::POST,
        _ => false,
    }
}
