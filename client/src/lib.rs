//! Client-side authentication session.
//!
//! Holds the current user and credential for an application, persists the
//! credential across restarts, and talks to the backend's session-check,
//! login and logout endpoints.
//!
//! ```ignore
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(FileStore::new(".auth-session.json"));
//! let provider = Arc::new(AuthProvider::from_config(&config, store)?);
//!
//! context::mount(provider, async {
//!     let auth = context::use_auth()?;
//!     let outcome = auth.login("a@b.com", "pw", "user").await;
//!     // ...
//! })
//! .await;
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod provider;
pub mod storage;

pub use api::{ApiError, AuthApi, Envelope, LoginRequest};
pub use config::{ClientConfig, ConfigError};
pub use context::{ContextError, mount, scope, use_auth};
pub use provider::{AuthOutcome, AuthProvider, AuthState};
pub use storage::{CredentialStore, FileStore, MemoryStore, StorageError};
