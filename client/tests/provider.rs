use std::sync::{Arc, Mutex};
use std::time::Duration;

use auth_session::{
    AuthOutcome, AuthProvider, ClientConfig, CredentialStore, FileStore, MemoryStore,
    StorageError, mount, use_auth,
};
use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Seen {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl Seen {
    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(value);
    }

    fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn provider(base: &str, store: Arc<dyn CredentialStore>) -> Arc<AuthProvider> {
    let config = ClientConfig::new(base).expect("config");
    Arc::new(AuthProvider::from_config(&config, store).expect("provider"))
}

/// Wraps a `MemoryStore` and fails the selected writes.
struct FlakyStore {
    inner: MemoryStore,
    fail_save: bool,
    fail_remove: bool,
}

impl FlakyStore {
    fn new(inner: MemoryStore, fail_save: bool, fail_remove: bool) -> Self {
        Self {
            inner,
            fail_save,
            fail_remove,
        }
    }
}

impl CredentialStore for FlakyStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_save {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_remove {
            return Err(std::io::Error::other("read-only").into());
        }
        self.inner.remove(key)
    }
}

fn check_auth_returning(seen: &Seen, status: StatusCode, body: Value) -> Router {
    let seen = seen.clone();
    Router::new().route(
        "/api/v1/check-auth",
        get(move |headers: HeaderMap| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.record(&headers);
                (status, Json(body))
            }
        }),
    )
}

fn login_returning(seen: &Seen, status: StatusCode, body: Value) -> Router {
    let seen = seen.clone();
    Router::new().route(
        "/api/v1/login",
        post(move |headers: HeaderMap, Json(req): Json<Value>| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.record(&headers);
                seen.bodies.lock().unwrap().push(req);
                (status, Json(body))
            }
        }),
    )
}

fn logout_returning(seen: &Seen, status: StatusCode, body: Value) -> Router {
    let seen = seen.clone();
    Router::new().route(
        "/api/v1/logout",
        get(move |headers: HeaderMap| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.record(&headers);
                (status, Json(body))
            }
        }),
    )
}

#[tokio::test]
async fn init_without_token_and_unsuccessful_check_leaves_state_empty() {
    let seen = Seen::default();
    let base = serve(check_auth_returning(&seen, StatusCode::OK, json!({"success": false}))).await;
    let p = provider(&base, Arc::new(MemoryStore::new()));

    p.init().await;

    let state = p.snapshot();
    assert_eq!(state.user, None);
    assert_eq!(state.token, None);
    assert!(!state.loading);
    assert_eq!(seen.auth_headers(), vec![None]);
}

#[tokio::test]
async fn init_with_persisted_token_adopts_session_and_rotated_token() {
    let seen = Seen::default();
    let base = serve(check_auth_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "data": {"id": "u1", "role": "user"}, "token": "rotated"}),
    ))
    .await;
    let store = Arc::new(MemoryStore::with_entry("token", "old"));
    let p = provider(&base, store.clone());

    p.init().await;

    let state = p.snapshot();
    assert_eq!(state.user, Some(json!({"id": "u1", "role": "user"})));
    assert_eq!(state.token.as_deref(), Some("rotated"));
    assert!(!state.loading);
    assert_eq!(store.load("token").unwrap().as_deref(), Some("rotated"));
    assert_eq!(seen.auth_headers(), vec![Some("Bearer old".to_string())]);
}

#[tokio::test]
async fn init_failure_still_clears_loading() {
    let seen = Seen::default();
    let base = serve(check_auth_returning(
        &seen,
        StatusCode::UNAUTHORIZED,
        json!({"message": "Invalid or expired token", "success": false}),
    ))
    .await;
    let p = provider(&base, Arc::new(MemoryStore::with_entry("token", "stale")));

    p.init().await;

    assert_eq!(p.user(), None);
    assert!(!p.is_loading());
}

#[tokio::test]
async fn login_success_adopts_user_and_persists_token() {
    let seen = Seen::default();
    let base = serve(login_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "user": {"email": "a@b.com"}, "token": "T"}),
    ))
    .await;
    let store = Arc::new(MemoryStore::new());
    let p = provider(&base, store.clone());

    let outcome = p.login("a@b.com", "pw", "user").await;

    assert_eq!(outcome, AuthOutcome::ok());
    assert_eq!(p.user(), Some(json!({"email": "a@b.com"})));
    assert_eq!(p.token().as_deref(), Some("T"));
    assert_eq!(store.load("token").unwrap().as_deref(), Some("T"));
    assert_eq!(
        seen.bodies.lock().unwrap().clone(),
        vec![json!({"email": "a@b.com", "password": "pw", "role": "user"})]
    );
}

#[tokio::test]
async fn login_failure_returns_server_message() {
    let seen = Seen::default();
    let base = serve(login_returning(
        &seen,
        StatusCode::UNAUTHORIZED,
        json!({"message": "Incorrect email or password.", "success": false}),
    ))
    .await;
    let p = provider(&base, Arc::new(MemoryStore::new()));

    let outcome = p.login("a@b.com", "wrong", "user").await;

    assert_eq!(outcome, AuthOutcome::failed("Incorrect email or password."));
    assert_eq!(p.user(), None);
    assert_eq!(p.token(), None);
}

#[tokio::test]
async fn login_failure_without_message_uses_default() {
    let base = serve(Router::new().route(
        "/api/v1/login",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    ))
    .await;
    let p = provider(&base, Arc::new(MemoryStore::new()));

    let outcome = p.login("a@b.com", "pw", "user").await;

    assert_eq!(outcome, AuthOutcome::failed("Login failed"));
}

#[tokio::test]
async fn login_against_unreachable_backend_is_a_value_not_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let p = provider(&format!("http://{addr}"), Arc::new(MemoryStore::new()));

    let outcome = p.login("a@b.com", "pw", "user").await;

    assert_eq!(outcome, AuthOutcome::failed("Login failed"));
}

#[tokio::test]
async fn login_attaches_current_token() {
    let seen = Seen::default();
    let base = serve(login_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "user": {}}),
    ))
    .await;
    let p = provider(&base, Arc::new(MemoryStore::with_entry("token", "held")));

    p.login("a@b.com", "pw", "admin").await;

    assert_eq!(seen.auth_headers(), vec![Some("Bearer held".to_string())]);
    // No new token in the response: the held one stays.
    assert_eq!(p.token().as_deref(), Some("held"));
}

#[tokio::test]
async fn logout_failure_reports_error_and_still_clears_local_state() {
    let seen = Seen::default();
    let base = serve(logout_returning(
        &seen,
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"message": "Internal server error", "success": false}),
    ))
    .await;
    let store = Arc::new(MemoryStore::with_entry("token", "T"));
    let p = provider(&base, store.clone());
    p.set_user(Some(json!({"id": "u1"})));

    let outcome = p.logout().await;

    assert_eq!(outcome, AuthOutcome::failed("Internal server error"));
    assert_eq!(p.user(), None);
    assert_eq!(p.token(), None);
    assert_eq!(store.load("token").unwrap(), None);
    assert_eq!(seen.auth_headers(), vec![Some("Bearer T".to_string())]);
}

#[tokio::test]
async fn logout_success_clears_everything() {
    let seen = Seen::default();
    let base = serve(logout_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "message": "Logged out successfully."}),
    ))
    .await;
    let store = Arc::new(MemoryStore::with_entry("token", "T"));
    let p = provider(&base, store.clone());
    p.set_user(Some(json!({"id": "u1"})));

    assert_eq!(p.logout().await, AuthOutcome::ok());
    assert!(!p.is_authenticated());
    assert_eq!(store.load("token").unwrap(), None);
}

#[tokio::test]
async fn logout_issued_during_login_runs_after_it() {
    let base = serve(
        Router::new()
            .route(
                "/api/v1/login",
                post(|| async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Json(json!({"success": true, "user": {"id": "u1"}, "token": "T"}))
                }),
            )
            .route(
                "/api/v1/logout",
                get(|| async { Json(json!({"success": true})) }),
            ),
    )
    .await;
    let store = Arc::new(MemoryStore::new());
    let p = provider(&base, store.clone());

    let (login, logout) = tokio::join!(p.login("a@b.com", "pw", "user"), p.logout());

    assert!(login.success);
    assert!(logout.success);
    assert_eq!(p.token(), None);
    assert_eq!(p.user(), None);
    assert_eq!(store.load("token").unwrap(), None);
}

#[tokio::test]
async fn mounted_body_sees_initialized_provider() {
    let seen = Seen::default();
    let base = serve(check_auth_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "data": {"id": "u1"}}),
    ))
    .await;
    let p = provider(&base, Arc::new(MemoryStore::with_entry("token", "T")));

    let (loading, user) = mount(p, async {
        let auth = use_auth().expect("inside provider scope");
        (auth.is_loading(), auth.user())
    })
    .await;

    assert!(!loading);
    assert_eq!(user, Some(json!({"id": "u1"})));
    assert!(use_auth().is_err());
}

#[tokio::test]
async fn logout_reports_failure_when_stored_token_cannot_be_removed() {
    let seen = Seen::default();
    let base = serve(logout_returning(&seen, StatusCode::OK, json!({"success": true}))).await;
    let store = Arc::new(FlakyStore::new(
        MemoryStore::with_entry("token", "T"),
        false,
        true,
    ));
    let p = provider(&base, store.clone());
    p.set_user(Some(json!({"id": "u1"})));

    let outcome = p.logout().await;

    assert_eq!(
        outcome,
        AuthOutcome::failed("Could not update stored credential")
    );
    assert!(!p.is_authenticated());
    assert_eq!(p.token(), None);
    // The backend was still told to end the session.
    assert_eq!(seen.auth_headers(), vec![Some("Bearer T".to_string())]);
}

#[tokio::test]
async fn login_fails_without_adopting_token_when_store_rejects_it() {
    let seen = Seen::default();
    let base = serve(login_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "user": {"id": "u1"}, "token": "T"}),
    ))
    .await;
    let store = Arc::new(FlakyStore::new(MemoryStore::new(), true, false));
    let p = provider(&base, store.clone());

    let outcome = p.login("a@b.com", "pw", "user").await;

    assert_eq!(
        outcome,
        AuthOutcome::failed("Could not update stored credential")
    );
    assert_eq!(p.user(), None);
    assert_eq!(p.token(), None);
    assert_eq!(store.load("token").unwrap(), None);
}

#[tokio::test]
async fn init_keeps_stored_token_when_rotation_cannot_be_persisted() {
    let seen = Seen::default();
    let base = serve(check_auth_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "data": {"id": "u1"}, "token": "rotated"}),
    ))
    .await;
    let store = Arc::new(FlakyStore::new(
        MemoryStore::with_entry("token", "old"),
        true,
        false,
    ));
    let p = provider(&base, store.clone());

    p.init().await;

    assert_eq!(p.user(), Some(json!({"id": "u1"})));
    assert_eq!(p.token().as_deref(), Some("old"));
    assert_eq!(store.load("token").unwrap().as_deref(), Some("old"));
    assert!(!p.is_loading());
}

#[tokio::test]
async fn login_persists_over_a_corrupt_credential_file() {
    let seen = Seen::default();
    let base = serve(login_returning(
        &seen,
        StatusCode::OK,
        json!({"success": true, "user": {"id": "u1"}, "token": "T"}),
    ))
    .await;
    let path = std::env::temp_dir().join(format!(
        "auth-session-login-corrupt-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, "not json").unwrap();
    let store = Arc::new(FileStore::new(&path));
    let p = provider(&base, store.clone());

    assert_eq!(p.login("a@b.com", "pw", "user").await, AuthOutcome::ok());
    assert_eq!(p.token().as_deref(), Some("T"));

    // A fresh provider over the same file picks the credential up again.
    let restarted = provider(&base, Arc::new(FileStore::new(&path)));
    assert_eq!(restarted.token().as_deref(), Some("T"));

    let _ = std::fs::remove_file(path);
}
