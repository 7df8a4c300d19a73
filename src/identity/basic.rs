//! HTTP Basic credentials and the configured admin identity.

use base64::Engine;
use subtle::ConstantTimeEq;

pub const BASIC_PREFIX: &str = "Basic ";

#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials").field("username", &self.username).finish_non_exhaustive()
    }
}

impl AdminCredentials {
    pub fn new<S: Into<String>>(username: S, password: S) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn username(&self) -> &str { &self.username }

    /// Exact match on both parts. Both comparisons always run. An unset
    /// password never matches.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok & pass_ok & !self.password.is_empty()
    }
}

/// Constant-time in the position of the first differing byte. Unequal lengths
/// return false without comparing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Decode `Basic base64(user:pass)`, splitting on the first ':'.
/// Any other shape is `None`.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix(BASIC_PREFIX)?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(raw: &str) -> String {
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }

    #[test]
    fn parses_well_formed_header() {
        assert_eq!(parse_basic(&header("admin:secret")), Some(("admin".into(), "secret".into())));
    }

    #[test]
    fn splits_on_first_colon_only() {
        assert_eq!(parse_basic(&header("admin:pa:ss")), Some(("admin".into(), "pa:ss".into())));
        assert_eq!(parse_basic(&header("admin:")), Some(("admin".into(), String::new())));
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert_eq!(parse_basic("Basic not-base64"), None);
        assert_eq!(parse_basic(&header("no-separator")), None);
        assert_eq!(parse_basic(&header("admin:secret").replace("Basic ", "Bearer ")), None);
        assert_eq!(parse_basic(&header("admin:secret").replace("Basic ", "basic ")), None);
        assert_eq!(parse_basic("Basic"), None);
        assert_eq!(parse_basic(""), None);
    }

    #[test]
    fn admin_match_is_exact() {
        let admin = AdminCredentials::new("admin", "secret");
        assert!(admin.matches("admin", "secret"));
        assert!(!admin.matches("admin", "secret2"));
        assert!(!admin.matches("admin", "secre"));
        assert!(!admin.matches("Admin", "secret"));
        assert!(!admin.matches("", ""));

        let unset = AdminCredentials::new("admin", "");
        assert!(!unset.matches("admin", ""));
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    // Best effort: an early mismatch should not be dramatically cheaper than a late one.
    #[test]
    fn comparison_cost_independent_of_mismatch_position() {
        let expected = vec![b'a'; 4096];
        let mut early = expected.clone();
        early[0] = b'b';
        let mut late = expected.clone();
        late[4095] = b'b';

        let time = |candidate: &[u8]| {
            let t0 = std::time::Instant::now();
            for _ in 0..2000 {
                std::hint::black_box(constant_time_eq(std::hint::black_box(candidate), &expected));
            }
            t0.elapsed().as_nanos().max(1)
        };
        // warm up
        time(&early);
        time(&late);
        let e = time(&early);
        let l = time(&late);
        let ratio = l.max(e) as f64 / l.min(e) as f64;
        assert!(ratio < 10.0, "early={e}ns late={l}ns");
    }
}
