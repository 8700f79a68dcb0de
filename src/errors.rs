use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::{ApiError, ErrorKind};
use crate::session::legacy::LegacyCookieError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", api_message(.0))]
    Api(#[from] ApiError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    LegacyCookie(#[from] LegacyCookieError),
}

/// Prefer the backend's own wording when it sent one.
fn api_message(e: &ApiError) -> String {
    e.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| e.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Api(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Transient => StatusCode::BAD_GATEWAY,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LegacyCookie(LegacyCookieError::MissingKey)
            | AppError::LegacyCookie(LegacyCookieError::InvalidKey) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::LegacyCookie(_) => StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AppError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        let api = |status| {
            AppError::Api(ApiError::Status {
                status,
                message: None,
            })
        };
        assert_eq!(status_of(api(409)), StatusCode::CONFLICT);
        assert_eq!(status_of(api(400)), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(api(503)), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(AppError::LegacyCookie(LegacyCookieError::MissingKey)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::LegacyCookie(LegacyCookieError::Decrypt)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_backend_message_preferred() {
        let e = AppError::Api(ApiError::Status {
            status: 422,
            message: Some("Judul wajib diisi".to_string()),
        });
        assert_eq!(e.to_string(), "Judul wajib diisi");
    }
}
