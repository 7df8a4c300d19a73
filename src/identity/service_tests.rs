use super::*;
use crate::identity::store::InMemorySessionStore;
use chrono::{Duration as ChronoDuration, Utc};

const SECRET: &[u8] = b"test-secret-key-for-jwt-signing";

fn setup(timeout_secs: u64) -> (Arc<InMemorySessionStore>, SessionService) {
    let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));
    let svc = SessionService::new(
        store.clone(),
        TokenSigner::new(SECRET, Duration::from_secs(3600), Duration::from_secs(timeout_secs)),
        AdminCredentials::new("admin", "correct-password"),
        Duration::from_secs(timeout_secs),
    );
    (store, svc)
}

fn login(user: &str, pass: &str) -> LoginRequest {
    LoginRequest {
        username: user.into(),
        password: pass.into(),
        client_address: "192.0.2.7".into(),
        user_agent: "redfishtool/1.0".into(),
    }
}

fn backdate(store: &InMemorySessionStore, id: &str, secs: i64) {
    let mut r = store.get(id).unwrap();
    r.last_access_at = Utc::now() - ChronoDuration::seconds(secs);
    store.update(r).unwrap();
}

#[test]
fn create_session_returns_record_and_token() {
    let (store, svc) = setup(1800);
    let resp = svc.create_session(&login("admin", "correct-password")).unwrap();
    assert_eq!(resp.session.username, "admin");
    assert_eq!(resp.session.token, resp.token);
    assert_eq!(resp.session.timeout_seconds, 1800);
    assert_eq!(resp.session.client_address, "192.0.2.7");
    assert_eq!(resp.session.user_agent, "redfishtool/1.0");
    assert!(resp.session.active);
    assert_eq!(store.get(&resp.session.id).unwrap(), resp.session);
}

#[test]
fn wrong_credentials_are_rejected() {
    let (store, svc) = setup(1800);
    for (u, p) in [("admin", "wrong"), ("root", "correct-password"), ("admin", "correct-passwor"), ("", "")] {
        assert_eq!(svc.create_session(&login(u, p)).unwrap_err(), SessionError::InvalidCredentials);
    }
    assert!(store.is_empty());
}

#[test]
fn second_login_for_same_user_conflicts() {
    let (_store, svc) = setup(1800);
    let first = svc.create_session(&login("admin", "correct-password")).unwrap();
    assert_eq!(svc.create_session(&login("admin", "correct-password")).unwrap_err(), SessionError::AlreadyExists);
    // the first session is untouched
    assert!(svc.validate_token(&first.token).is_ok());
    assert_eq!(svc.session_count().unwrap(), 1);
}

#[test]
fn login_allowed_again_after_delete_or_expiry() {
    let (store, svc) = setup(60);
    let first = svc.create_session(&login("admin", "correct-password")).unwrap();
    svc.delete_session(&first.session.id).unwrap();
    let second = svc.create_session(&login("admin", "correct-password")).unwrap();
    assert_ne!(first.session.id, second.session.id);
    assert_ne!(first.token, second.token);

    backdate(&store, &second.session.id, 120);
    let third = svc.create_session(&login("admin", "correct-password")).unwrap();
    assert_ne!(third.session.id, second.session.id);
}

#[test]
fn validate_token_touches_session() {
    let (store, svc) = setup(60);
    let resp = svc.create_session(&login("admin", "correct-password")).unwrap();
    backdate(&store, &resp.session.id, 50);
    let stale = store.get(&resp.session.id).unwrap().last_access_at;

    let refreshed = svc.validate_token(&resp.token).unwrap();
    assert!(refreshed.last_access_at > stale);
    assert_eq!(store.get(&resp.session.id).unwrap().last_access_at, refreshed.last_access_at);
    assert!(refreshed.expires_at() > Utc::now() + ChronoDuration::seconds(50));
}

#[test]
fn validate_after_expiry_never_revives() {
    let (store, svc) = setup(60);
    let resp = svc.create_session(&login("admin", "correct-password")).unwrap();
    backdate(&store, &resp.session.id, 61);
    assert_eq!(svc.validate_token(&resp.token).unwrap_err(), SessionError::Expired);
    assert_eq!(svc.validate_token(&resp.token).unwrap_err(), SessionError::Expired);
    assert_eq!(svc.get_session(&resp.session.id).unwrap_err(), SessionError::Expired);
}

#[test]
fn validate_rejects_bad_tokens() {
    let (_store, svc) = setup(60);
    assert_eq!(svc.validate_token("garbage").unwrap_err(), SessionError::InvalidToken);

    let foreign = TokenSigner::new(b"other", Duration::from_secs(60), Duration::from_secs(60))
        .issue("admin", "sid")
        .unwrap();
    assert_eq!(svc.validate_token(&foreign).unwrap_err(), SessionError::InvalidToken);
}

#[test]
fn well_signed_token_without_session_is_not_found() {
    let (_store, svc) = setup(60);
    let orphan = TokenSigner::new(SECRET, Duration::from_secs(60), Duration::from_secs(60))
        .issue("admin", "never-stored")
        .unwrap();
    assert_eq!(svc.validate_token(&orphan).unwrap_err(), SessionError::NotFound);
}

#[test]
fn deleted_session_token_no_longer_resolves() {
    let (_store, svc) = setup(60);
    let resp = svc.create_session(&login("admin", "correct-password")).unwrap();
    svc.delete_session(&resp.session.id).unwrap();
    assert_eq!(svc.validate_token(&resp.token).unwrap_err(), SessionError::NotFound);
    assert_eq!(svc.get_session(&resp.session.id).unwrap_err(), SessionError::NotFound);
    assert_eq!(svc.delete_session(&resp.session.id).unwrap_err(), SessionError::NotFound);
}

#[test]
fn list_sessions_passes_through() {
    let (_store, svc) = setup(60);
    assert!(svc.list_sessions().unwrap().is_empty());
    let resp = svc.create_session(&login("admin", "correct-password")).unwrap();
    let listed = svc.list_sessions().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, resp.session.id);
    assert_eq!(svc.session_timeout_secs(), 60);
}

/// Store whose reads work but whose writes fail.
struct ReadOnlyStore(InMemorySessionStore);

impl SessionStore for ReadOnlyStore {
    fn create(&self, _r: SessionRecord) -> Result<(), SessionError> { Err(SessionError::Storage("read-only".into())) }
    fn get(&self, id: &str) -> Result<SessionRecord, SessionError> { self.0.get(id) }
    fn get_by_token(&self, t: &str) -> Result<SessionRecord, SessionError> { self.0.get_by_token(t) }
    fn update(&self, _r: SessionRecord) -> Result<(), SessionError> { Err(SessionError::Storage("read-only".into())) }
    fn delete(&self, id: &str) -> Result<(), SessionError> { self.0.delete(id) }
    fn list(&self) -> Result<Vec<SessionRecord>, SessionError> { self.0.list() }
    fn delete_expired(&self) -> Result<usize, SessionError> { self.0.delete_expired() }
}

#[test]
fn storage_failures_propagate() {
    let inner = InMemorySessionStore::new(Duration::from_secs(3600));
    let signer = TokenSigner::new(SECRET, Duration::from_secs(60), Duration::from_secs(60));
    let token = signer.issue("admin", "sid-1").unwrap();
    inner.create(SessionRecord::new("sid-1".into(), "admin".into(), token.clone(), 60, String::new(), String::new())).unwrap();

    let svc = SessionService::new(
        Arc::new(ReadOnlyStore(inner)),
        signer,
        AdminCredentials::new("admin", "pw"),
        Duration::from_secs(60),
    );
    assert!(matches!(svc.validate_token(&token), Err(SessionError::Storage(_))));
    // login conflicts first because sid-1 is live for admin
    assert_eq!(svc.create_session(&login("admin", "pw")).unwrap_err(), SessionError::AlreadyExists);
    svc.delete_session("sid-1").unwrap();
    assert!(matches!(svc.create_session(&login("admin", "pw")), Err(SessionError::Storage(_))));
}

#[test]
fn from_config_uses_auth_settings() {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));
    let auth = AuthConfig {
        admin_username: "root".into(),
        admin_password: "toor".into(),
        jwt_key: "k".into(),
        jwt_expiration_secs: 10,
        session_timeout_secs: 900,
        cleanup_interval_secs: 60,
    };
    let svc = SessionService::from_config(store, &auth);
    assert_eq!(svc.session_timeout_secs(), 900);
    let resp = svc.create_session(&login("root", "toor")).unwrap();
    assert_eq!(resp.session.timeout_seconds, 900);
}

#[test]
fn concurrent_validations_keep_single_session() {
    let (store, svc) = setup(60);
    let svc = Arc::new(svc);
    let resp = svc.create_session(&login("admin", "correct-password")).unwrap();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = svc.clone();
            let tok = resp.token.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    svc.validate_token(&tok).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.len(), 1);
    assert_eq!(svc.list_sessions().unwrap().iter().filter(|s| s.username == "admin").count(), 1);
}
