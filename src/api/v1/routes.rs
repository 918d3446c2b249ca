/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /check-auth は gate 配下、/admin/ping は gate + role gate 配下
 * - layer の適用順もここで決める (外側: gate → 内側: role gate)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{admin::admin_ping, session::check_auth};
use crate::middleware::auth::{access, role};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new().route("/admin/ping", get(admin_ping));
    let admin = role::require_role(admin, &state.admin_role);

    let protected = Router::new()
        .route("/check-auth", get(check_auth))
        .merge(admin);

    access::apply(protected, state)
}
