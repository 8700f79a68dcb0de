use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::session::{gate, SessionContext};
use crate::state::cookie_header;

/// Page-level access control from the session cookies. API routes pass through.
pub async fn gate_pages(req: Request, next: Next) -> Response {
    let redirect = {
        let path = req.uri().path();
        if path.starts_with("/api/") {
            None
        } else {
            let ctx = SessionContext::from_cookies(cookie_header(req.headers()));
            gate(path, &ctx)
        }
    };

    match redirect {
        Some(to) => {
            tracing::debug!(path = %req.uri().path(), to, "page gated");
            Redirect::to(to).into_response()
        }
        None => next.run(req).await,
    }
}
