//! Scoped access to the current [`AuthProvider`].
//!
//! [`mount`] runs the initial session check and then drives the body with the
//! provider in scope. Inside, [`use_auth`] returns it; outside, it fails
//! immediately with [`ContextError::OutsideProvider`] rather than handing back
//! an empty state.
//!
//! The scope is task-local. Work moved onto another task with
//! `tokio::spawn` must re-enter it with [`scope`].
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::provider::AuthProvider;

tokio::task_local! {
    static CURRENT: Arc<AuthProvider>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("use_auth must be called within a mounted auth provider scope")]
    OutsideProvider,
}

/// Checks the session, then runs `body` with `provider` in scope.
///
/// `body` never observes `loading == true`.
pub async fn mount<F>(provider: Arc<AuthProvider>, body: F) -> F::Output
where
    F: Future,
{
    provider.init().await;
    CURRENT.scope(provider, body).await
}

/// Runs `body` with an already-initialized `provider` in scope.
pub async fn scope<F>(provider: Arc<AuthProvider>, body: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(provider, body).await
}

pub fn use_auth() -> Result<Arc<AuthProvider>, ContextError> {
    CURRENT
        .try_with(Arc::clone)
        .map_err(|_| ContextError::OutsideProvider)
}
