/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 認証エラー (AuthError) を 401 に統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

/// Body for 401 / 500. Clients read `message` and branch on `success`.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub message: String,
    pub success: bool,
}

/// Body for 403. The role gate has never carried a `success` flag.
#[derive(Debug, Serialize)]
pub struct ForbiddenBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("Only {required_role}s can perform this action.")]
    Forbidden { required_role: String },
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn forbidden(required_role: impl Into<String>) -> Self {
        Self::Forbidden {
            required_role: required_role.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        match self {
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                Json(FailureBody {
                    message,
                    success: false,
                }),
            )
                .into_response(),
            AppError::Forbidden { .. } => {
                (StatusCode::FORBIDDEN, Json(ForbiddenBody { message })).into_response()
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureBody {
                    message,
                    success: false,
                }),
            )
                .into_response(),
        }
    }
}
