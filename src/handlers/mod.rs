pub mod continuation;
pub mod diagnostics;
pub mod edge;
pub mod health;
pub mod mabar;
pub mod session;

use crate::errors::AppError;

pub async fn fallback(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
