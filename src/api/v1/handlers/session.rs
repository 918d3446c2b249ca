/*
 * Responsibility
 * - GET /check-auth
 * - gate を通過したリクエストの Identity をそのまま返す (client の session check 用)
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::{CurrentIdentity, Identity};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub data: Identity,
}

pub async fn check_auth(CurrentIdentity(identity): CurrentIdentity) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        data: identity,
    })
}
