//! access token (JWT) 検証 → Identity を extensions に入れる
//!
//! 解決順:
//! - cookie (`Config::token_cookie_name`) を先に見る
//! - 無ければ `Authorization: Bearer <token>`
//! - どちらも無ければ即 401
//!
//! ログには生のトークンを出さない。subject / role / 判定結果と指紋だけを残す。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::v1::extractors::Identity;
use crate::error::AppError;
use crate::services::auth::{AuthError, token_fingerprint};
use crate::state::AppState;

/// 認証が必要な Router に gate を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/check-auth", get(check_auth));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// app = app.nest("/api/v1", protected);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Header,
}

impl TokenSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cookie => "cookie",
            Self::Header => "header",
        }
    }
}

/// cookie → `Authorization: Bearer` の順で探す。空の値は無いものとして扱う。
pub fn resolve_token(headers: &HeaderMap, cookie_name: &str) -> Option<(String, TokenSource)> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some((cookie.value().to_string(), TokenSource::Cookie));
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("Bearer "))
        .and_then(|v| v.split(' ').nth(1))
        .filter(|t| !t.is_empty())
        .map(|t| (t.to_string(), TokenSource::Header))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some((token, source)) = resolve_token(req.headers(), &state.token_cookie_name) else {
        let err = AuthError::MissingCredential;
        tracing::warn!(outcome = "rejected", reason = err.kind(), "no credential on request");
        return Err(err.into());
    };

    let token_fp = token_fingerprint(&token);

    let verified = match state.auth.verify_verified(&token) {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(
                outcome = "rejected",
                reason = err.kind(),
                source = source.as_str(),
                token_fp = %token_fp,
                error = ?err,
                "access token verification failed"
            );
            return Err(err.into());
        }
    };

    let identity = Identity::from(verified);
    tracing::debug!(
        outcome = "accepted",
        source = source.as_str(),
        token_fp = %token_fp,
        user_id = %identity.id,
        role = identity.role.as_deref().unwrap_or("-"),
        "request authenticated"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
