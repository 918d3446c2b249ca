/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService (secret は構築時に注入済み)
 *   - token_cookie_name / admin_role: Config 由来の読み取り専用値
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub token_cookie_name: Arc<str>,
    pub admin_role: Arc<str>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, config: &Config) -> Self {
        Self {
            auth,
            token_cookie_name: Arc::from(config.token_cookie_name.as_str()),
            admin_role: Arc::from(config.admin_role.as_str()),
        }
    }
}
