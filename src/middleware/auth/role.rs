//! role gate: 認証済み Identity の role が要求 role と一致するか見る
//!
//! - 認証はしない。`access::apply` が外側で Identity を入れている前提
//! - 不一致 (role 無しを含む) → 403
//! - Identity が無い → 配線ミスなので 500

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::Identity;
use crate::error::AppError;

#[derive(Debug, Clone)]
struct RequiredRole(Arc<str>);

/// `router` 配下の route を `role` 限定にする。
pub fn require_role<S>(router: Router<S>, role: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        RequiredRole(Arc::from(role)),
        role_middleware,
    ))
}

async fn role_middleware(
    State(RequiredRole(required)): State<RequiredRole>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(identity) = req.extensions().get::<Identity>() else {
        tracing::error!(required_role = %required, "role gate reached without an authenticated identity");
        return Err(AppError::Internal);
    };

    if !identity.has_role(&required) {
        tracing::warn!(
            outcome = "forbidden",
            user_id = %identity.id,
            role = identity.role.as_deref().unwrap_or("-"),
            required_role = %required,
            "role gate rejected request"
        );
        return Err(AppError::forbidden(&*required));
    }

    Ok(next.run(req).await)
}
