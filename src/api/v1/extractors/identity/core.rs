use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::AuthError;

use super::Identity;

/// Handler で Identity を受け取るための extractor
/// middleware が Identity を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（ミドルウェア未設定の route でも素通りさせない）
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthorized(AuthError::MissingCredential))
    }
}
