use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::utils::error_codes;

/// Error taxonomy shared by every handler. Database and upstream
/// failures keep their source so the cause can be logged server-side
/// while the client only sees a generic message.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Auth(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Upstream(String),
    Database(sqlx::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, i32, String) {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, msg.clone())
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED, msg.clone()),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, error_codes::CONFLICT, msg.clone()),
            AppError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::UPSTREAM_ERROR,
                "Error en un servicio externo".to_string(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "Error interno del servidor".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("database error: {:?}", e),
            AppError::Upstream(msg) => tracing::error!("upstream error: {}", msg),
            _ => {}
        }

        let (status, code, error_message) = self.parts();
        let body = Json(ErrorResponse { code, error_message });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Upstream(format!("bcrypt: {e}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::Auth("Token inválido".to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Upstream("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.parts().0, expected);
        }
    }

    #[test]
    fn internal_errors_never_leak_details() {
        let err = AppError::Upstream("api key sk-secret rejected".into());
        let (_, _, msg) = err.parts();
        assert!(!msg.contains("sk-secret"));
    }
}
