use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::CurrentIdentity;

#[derive(Debug, Serialize)]
pub struct AdminPingResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Reachable only through the gate and the admin role gate.
pub async fn admin_ping(CurrentIdentity(identity): CurrentIdentity) -> Json<AdminPingResponse> {
    tracing::info!(user_id = %identity.id, "admin ping");
    Json(AdminPingResponse {
        success: true,
        message: "admin access granted",
    })
}
