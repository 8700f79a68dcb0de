use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use crate::errors::AppError;
use crate::session::cookies::{cookie_value, IDENTITY_COOKIE};
use crate::session::legacy::decrypt_identity;
use crate::state::{cookie_header, AppState};

// GET /unauthorized
pub async fn unauthorized_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let identity = cookie_header(&headers)
        .and_then(|h| cookie_value(h, IDENTITY_COOKIE))
        .map(|c| decrypt_identity(&c, &state.config.app_key))
        .transpose()?;

    let detail = match identity {
        Some(id) => format!(
            "<p>Masuk sebagai pengguna #{} dengan peran <strong>{}</strong>.</p>",
            id.user_id,
            id.role.as_str()
        ),
        None => "<p>Tidak ada identitas login.</p>".to_string(),
    };

    Ok(Html(format!(
        "<!DOCTYPE html><html lang=\"id\"><head><meta charset=\"utf-8\"><title>Akses ditolak</title></head>\
         <body><h1>Akses ditolak</h1><p>Anda tidak memiliki akses ke halaman ini.</p>{detail}\
         <p><a href=\"/\">Kembali ke beranda</a></p></body></html>"
    )))
}
