use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde_json::json;

use crate::flows::effects::LOGIN_PATH;
use crate::session::SessionContext;
use crate::state::{cookie_header, AppState};

// GET /api/session
pub async fn current(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let api = state.api_for(&headers);
    let ctx = SessionContext::initialize(&api, cookie_header(&headers)).await;
    Json(json!({
        "authenticated": ctx.is_authenticated(),
        "role": ctx.role(),
        "user": ctx.user(),
        "home_path": ctx.home_path(),
    }))
}

// POST /api/session/logout
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let api = state.api_for(&headers);
    let mut ctx = SessionContext::from_cookies(cookie_header(&headers));
    let cleared = ctx.logout(&api).await;
    tracing::info!("user logged out");

    let cookies = cleared.into_iter().map(|c| (header::SET_COOKIE, c));
    (
        AppendHeaders(cookies),
        Json(json!({ "redirect": LOGIN_PATH })),
    )
}
