//! Authentication state for one application instance.
//!
//! State is `{user, token, loading}`. The token lives both here and in the
//! [`CredentialStore`]; every operation leaves the two equal or both absent.
//! The store is written first and memory only follows a successful write.
//! The one exception is `logout`, which always clears memory and reports a
//! store that could not be cleared as a failed outcome.
//!
//! `init`, `login` and `logout` are serialized: a logout issued while a login
//! is in flight runs after it, so the last operation started is the one whose
//! result the state reflects.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::api::{ApiError, AuthApi, LoginRequest};
use crate::config::ClientConfig;
use crate::storage::{CredentialStore, StorageError};

const LOGIN_FAILED: &str = "Login failed";
const LOGOUT_FAILED: &str = "Logout failed";
const STORAGE_FAILED: &str = "Could not update stored credential";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<serde_json::Value>,
    pub token: Option<String>,
    /// True until the first session check completes.
    pub loading: bool,
}

/// Result of `login` / `logout`. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    fn from_api_error(err: &ApiError, fallback: &str) -> Self {
        Self::failed(err.server_message().unwrap_or(fallback))
    }
}

pub struct AuthProvider {
    api: AuthApi,
    store: Arc<dyn CredentialStore>,
    storage_key: String,
    state: RwLock<AuthState>,
    ops: Mutex<()>,
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        let state = self.read_state();
        f.debug_struct("AuthProvider")
            .field("base_url", &self.api.config().base_url())
            .field("authenticated", &state.user.is_some())
            .field("has_token", &state.token.is_some())
            .field("loading", &state.loading)
            .finish()
    }
}

impl AuthProvider {
    /// Reads the persisted credential; the session is not checked until [`init`](Self::init).
    pub fn new(api: AuthApi, store: Arc<dyn CredentialStore>) -> Self {
        let storage_key = api.config().storage_key.clone();
        let token = load_token(store.as_ref(), &storage_key);
        tracing::debug!(has_token = token.is_some(), "auth provider created");

        Self {
            api,
            store,
            storage_key,
            state: RwLock::new(AuthState {
                user: None,
                token,
                loading: true,
            }),
            ops: Mutex::new(()),
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(AuthApi::new(config.clone())?, store))
    }

    /// Initial session check. Always clears `loading`, whatever happens.
    pub async fn init(&self) {
        let _op = self.ops.lock().await;

        let token = load_token(self.store.as_ref(), &self.storage_key);

        match self.api.check_session(token.as_deref()).await {
            Ok(env) if env.success => {
                let (session, new_token) = env.into_session();
                if let Some(new_token) = new_token {
                    if let Err(err) = self.adopt_token(new_token) {
                        tracing::warn!(error = %err, "rotated credential not persisted; keeping the stored one");
                    }
                }
                self.write_state().user = session;
                tracing::info!(outcome = "authenticated", "session check completed");
            }
            Ok(_) => {
                tracing::info!(outcome = "anonymous", "session check completed");
            }
            Err(err) => {
                tracing::warn!(outcome = "failed", error = %err, "session check failed");
            }
        }

        self.write_state().loading = false;
    }

    pub async fn login(&self, email: &str, password: &str, role: &str) -> AuthOutcome {
        let _op = self.ops.lock().await;

        let token = self.token();
        let body = LoginRequest {
            email,
            password,
            role,
        };

        match self.api.login(&body, token.as_deref()).await {
            Ok(env) if env.success => {
                let (session, new_token) = env.into_session();
                if let Some(new_token) = new_token {
                    if let Err(err) = self.adopt_token(new_token) {
                        tracing::warn!(outcome = "failed", role, error = %err, "login; credential not persisted");
                        return AuthOutcome::failed(STORAGE_FAILED);
                    }
                }
                self.write_state().user = session;
                tracing::info!(outcome = "success", role, "login");
                AuthOutcome::ok()
            }
            Ok(env) => {
                tracing::warn!(outcome = "refused", role, "login");
                AuthOutcome::failed(env.message.unwrap_or_else(|| LOGIN_FAILED.to_string()))
            }
            Err(err) => {
                tracing::warn!(outcome = "failed", role, error = %err, "login");
                AuthOutcome::from_api_error(&err, LOGIN_FAILED)
            }
        }
    }

    /// Local state is cleared before the remote call, so a failed or
    /// abandoned logout never leaves the client believing it is signed in.
    /// A store that cannot be cleared turns the outcome into a failure even
    /// when the backend accepted the logout.
    pub async fn logout(&self) -> AuthOutcome {
        let _op = self.ops.lock().await;

        let token = self.token();
        let cleared = self.clear_local();

        let outcome = match self.api.logout(token.as_deref()).await {
            Ok(_) => {
                tracing::info!(outcome = "success", "logout");
                AuthOutcome::ok()
            }
            Err(err) => {
                tracing::warn!(outcome = "failed", error = %err, "logout; local session already cleared");
                AuthOutcome::from_api_error(&err, LOGOUT_FAILED)
            }
        };

        match cleared {
            Ok(()) => outcome,
            Err(err) => {
                tracing::warn!(outcome = "failed", error = %err, "logout; stored credential not removed");
                AuthOutcome::failed(STORAGE_FAILED)
            }
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.read_state().clone()
    }

    pub fn user(&self) -> Option<serde_json::Value> {
        self.read_state().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read_state().token.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().user.is_some()
    }

    pub fn set_user(&self, user: Option<serde_json::Value>) {
        self.write_state().user = user;
    }

    /// Replaces the credential in storage, then in memory.
    ///
    /// On a storage error the in-memory token is left as it was.
    pub fn set_token(&self, token: Option<String>) -> Result<(), StorageError> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => self.adopt_token(token),
            None => {
                self.store.remove(&self.storage_key)?;
                self.write_state().token = None;
                Ok(())
            }
        }
    }

    fn adopt_token(&self, token: String) -> Result<(), StorageError> {
        self.store.save(&self.storage_key, &token)?;
        self.write_state().token = Some(token);
        Ok(())
    }

    fn clear_local(&self) -> Result<(), StorageError> {
        let removed = self.store.remove(&self.storage_key);
        let mut state = self.write_state();
        state.user = None;
        state.token = None;
        removed
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_token(store: &dyn CredentialStore, key: &str) -> Option<String> {
    match store.load(key) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read persisted credential");
            None
        }
    }
}
