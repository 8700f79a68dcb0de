use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::checkout::{self, BookingDraft, GuestContact};
use crate::flows::continuation::{
    ContinuationFlow, ContinuationParams, PaymentPhase, Readiness, Source,
};
use crate::flows::countdown::{format_remaining, spawn_timer, CountdownFrame};
use crate::flows::Effect;
use crate::models::Booking;
use crate::payment::{HtmlHead, PaymentBridge, PaymentOutcome};
use crate::services::{fields, payments};
use crate::state::AppState;

static CONTINUE_HTML: &str = include_str!("../web/continue.html");

fn unknown(mount: Uuid) -> AppError {
    AppError::NotFound(format!("payment page {mount}"))
}

// GET /payment/continue
pub async fn continue_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let head = HtmlHead::new();
    let mut bridge = PaymentBridge::new(&state.config);
    bridge.ensure_loaded(&head).await;
    Html(CONTINUE_HTML.replace("{{payment_script}}", &head.render()))
}

#[derive(Serialize)]
pub struct ContinuationView {
    invoice: String,
    source: Source,
    phase: PaymentPhase,
    remaining_seconds: i64,
    display: String,
    booking: Booking,
}

impl ContinuationView {
    fn of(flow: &ContinuationFlow) -> Self {
        let remaining_seconds = flow.remaining_seconds();
        Self {
            invoice: flow.invoice().to_string(),
            source: flow.source(),
            phase: flow.phase(),
            remaining_seconds,
            display: format_remaining(remaining_seconds),
            booking: flow.booking().clone(),
        }
    }
}

#[derive(Serialize)]
struct MountedView {
    mount_id: Uuid,
    #[serde(flatten)]
    view: ContinuationView,
}

fn register(state: &AppState, flow: ContinuationFlow) -> Result<Response, AppError> {
    let view = ContinuationView::of(&flow);
    let mount_id = state.mount_flow(flow)?;
    tracing::info!(invoice = %view.invoice, %mount_id, remaining = view.remaining_seconds, "payment page mounted");
    Ok(Json(MountedView { mount_id, view }).into_response())
}

// GET /api/payments/continue?invoice=..&source=..
pub async fn mount(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ContinuationParams>,
) -> Result<Response, AppError> {
    let api = state.api_for(&headers);
    let flow = match ContinuationFlow::mount(&api, &params, Utc::now()).await {
        Ok(flow) => flow,
        Err(effects) => return Ok(Json(json!({ "effects": effects })).into_response()),
    };

    register(&state, flow)
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub field_id: i64,
    pub booking_date: NaiveDate,
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<Response, AppError> {
    let api = state.api_for(&headers);
    let draft = BookingDraft {
        field: fields::get(&api, req.field_id).await?,
        date: req.booking_date,
        slots: req.time_slots,
        guest: GuestContact {
            name: req.customer_name,
            phone: req.customer_phone,
        },
    };

    let source = Source::parse(req.source.as_deref());
    let flow = match checkout::place(&api, &draft, source, Utc::now()).await {
        Ok(flow) => flow,
        Err(effects) => return Ok(Json(json!({ "effects": effects })).into_response()),
    };

    register(&state, flow)
}

// POST /api/payments/:mount/continue
pub async fn resume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(mount): Path<Uuid>,
    Json(readiness): Json<Readiness>,
) -> Result<Json<serde_json::Value>, AppError> {
    let invoice = {
        let mut flows = state.flows()?;
        let flow = flows.get_mut(&mount).ok_or_else(|| unknown(mount))?;
        if let Err(blocked) = flow.begin(readiness) {
            return Ok(Json(json!({
                "blocked": blocked,
                "phase": flow.phase(),
                "effects": blocked.effects(),
            })));
        }
        flow.invoice().to_string()
    };

    let result = payments::issue_token(&state.api_for(&headers), &invoice).await;

    let mut flows = state.flows()?;
    let flow = flows.get_mut(&mount).ok_or_else(|| unknown(mount))?;
    match result {
        Ok(token) => {
            flow.token_issued();
            Ok(Json(json!({
                "token": token.token,
                "redirect_url": token.redirect_url,
                "phase": flow.phase(),
            })))
        }
        Err(e) => {
            let effects = flow.token_failed(&e);
            Ok(Json(json!({ "phase": flow.phase(), "effects": effects })))
        }
    }
}

// POST /api/payments/:mount/outcome
pub async fn outcome(
    State(state): State<Arc<AppState>>,
    Path(mount): Path<Uuid>,
    Json(outcome): Json<PaymentOutcome>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (effects, phase) = {
        let mut flows = state.flows()?;
        let flow = flows.get_mut(&mount).ok_or_else(|| unknown(mount))?;
        let effects = flow.resolve(&outcome);
        (effects, flow.phase())
    };

    if effects.iter().any(Effect::is_navigation) {
        state.unmount(mount)?;
    }
    Ok(Json(json!({ "phase": phase, "effects": effects })))
}

// GET /api/payments/:mount/countdown
//
// A new subscription replaces the mount's previous timer.
pub async fn countdown(
    State(state): State<Arc<AppState>>,
    Path(mount): Path<Uuid>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    if !state.flows()?.contains_key(&mount) {
        return Err(unknown(mount));
    }

    let ticker = state.clone();
    let (frames, timer) = spawn_timer(Duration::from_secs(1), move || {
        let mut flows = ticker.continuations.lock().ok()?;
        let flow = flows.get_mut(&mount)?;
        let effects = flow.tick();
        Some(CountdownFrame::of(flow.countdown(), effects))
    });
    state.watch_countdown(mount, timer);

    let stream = frames.map(|frame| {
        let data = serde_json::to_string(&frame).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data).event("countdown"))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// DELETE /api/payments/:mount
pub async fn unmount(
    State(state): State<Arc<AppState>>,
    Path(mount): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.unmount(mount)?;
    Ok(StatusCode::NO_CONTENT)
}
