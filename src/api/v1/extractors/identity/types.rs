/*
 * Responsibility
 * - Handler から見える「認証済み主体」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - リクエスト 1 件の間だけ存在する (保存しない)
 */
use serde::Serialize;

use crate::services::auth::VerifiedAccessToken;

/// 認証済みのリクエストに付与される主体
///
/// - `id` はトークンの subject (`userId`)
/// - `role` はトークンに含まれていれば入る。role gate はこれを見る
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub role: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Option<String>) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn has_role(&self, required: &str) -> bool {
        self.role.as_deref() == Some(required)
    }
}

impl From<VerifiedAccessToken> for Identity {
    fn from(v: VerifiedAccessToken) -> Self {
        Self::new(v.subject, v.role)
    }
}
