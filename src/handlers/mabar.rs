use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::{ApiClient, FilePart};
use crate::errors::AppError;
use crate::flows::editor::{EditError, SessionEditor};
use crate::flows::join::{self, JoinContext, JoinForm};
use crate::flows::moderation::{self, GuestError, GuestModal, HostAction, ModerationError};
use crate::flows::proof::{ProofFile, ProofUploadError, ProofUploadModal};
use crate::models::{MabarSession, User};
use crate::services::mabar;
use crate::session::SessionContext;
use crate::state::{cookie_header, AppState};

impl From<ModerationError> for AppError {
    fn from(e: ModerationError) -> Self {
        match e {
            ModerationError::NotHost => AppError::Forbidden,
            ModerationError::UnknownParticipant(id) => AppError::NotFound(format!("participant {id}")),
            ModerationError::Transition(t) => AppError::BadRequest(t.to_string()),
        }
    }
}

impl From<GuestError> for AppError {
    fn from(e: GuestError) -> Self {
        match e {
            GuestError::EmptyName => AppError::BadRequest(e.to_string()),
            GuestError::Api(api) => AppError::Api(api),
        }
    }
}

impl From<ProofUploadError> for AppError {
    fn from(e: ProofUploadError) -> Self {
        match e {
            ProofUploadError::Rejected(r) => AppError::BadRequest(r.to_string()),
            ProofUploadError::Api(api) => AppError::Api(api),
        }
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::Api(api) => AppError::Api(api),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

async fn acting_user(state: &AppState, headers: &HeaderMap) -> Result<(ApiClient, User), AppError> {
    let api = state.api_for(headers);
    let ctx = SessionContext::initialize(&api, cookie_header(headers)).await;
    let user = ctx.user().cloned().ok_or(AppError::Unauthorized)?;
    Ok((api, user))
}

async fn hosted_session(api: &ApiClient, id: i64, user: &User) -> Result<MabarSession, AppError> {
    let session = mabar::get(api, id).await?;
    if !session.is_host(user.id) {
        return Err(AppError::Forbidden);
    }
    Ok(session)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.to_string())
}

// POST /api/mabar/:id/join
pub async fn join_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(form): Json<JoinForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let api = state.api_for(&headers);
    let ctx = SessionContext::from_cookies(cookie_header(&headers));
    let session = mabar::get(&api, id).await?;
    let join_ctx = JoinContext::for_session(&session, ctx.is_authenticated());

    let mut refreshed = None;
    let (api_ref, slot) = (&api, &mut refreshed);
    let outcome = join::submit(&api, id, &form, join_ctx, move || async move {
        *slot = mabar::get(api_ref, id).await.ok();
    })
    .await;

    Ok(Json(json!({
        "step": outcome.step,
        "participant_id": outcome.participant_id,
        "effects": outcome.effects,
        "session": refreshed.unwrap_or(session),
    })))
}

// DELETE /api/mabar/:id/join
pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (api, user) = acting_user(&state, &headers).await?;
    let session = mabar::get(&api, id).await?;

    let mut refreshed = None;
    let (api_ref, slot) = (&api, &mut refreshed);
    let effects = moderation::cancel_participation(&api, &session, user.id, move || async move {
        *slot = mabar::get(api_ref, id).await.ok();
    })
    .await;

    Ok(Json(json!({
        "effects": effects,
        "session": refreshed.unwrap_or(session),
    })))
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub action: HostAction,
    #[serde(default)]
    pub confirmed: bool,
}

// POST /api/mabar/:id/participants/:pid/moderate
pub async fn moderate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, participant_id)): Path<(i64, i64)>,
    Json(body): Json<ModerateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (api, user) = acting_user(&state, &headers).await?;
    let session = mabar::get(&api, id).await?;
    let request = moderation::request(&session, user.id, participant_id, body.action)?;

    if !body.confirmed {
        return Ok(Json(json!({ "confirm": request })));
    }

    let mut refreshed = None;
    let (api_ref, slot) = (&api, &mut refreshed);
    let effects = moderation::execute(&api, request.confirm(), move || async move {
        *slot = mabar::get(api_ref, id).await.ok();
    })
    .await;

    Ok(Json(json!({
        "effects": effects,
        "session": refreshed.unwrap_or(session),
    })))
}

#[derive(Deserialize)]
pub struct GuestRequest {
    pub name: String,
}

// POST /api/mabar/:id/guests
pub async fn add_guest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<GuestRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (api, user) = acting_user(&state, &headers).await?;
    hosted_session(&api, id, &user).await?;

    let mut modal = GuestModal::default();
    modal.open();
    modal.name = body.name;

    let mut refreshed = None;
    let (api_ref, slot) = (&api, &mut refreshed);
    modal
        .submit(&api, id, move || async move {
            *slot = mabar::get(api_ref, id).await.ok();
        })
        .await?;

    Ok(Json(json!({ "open": modal.open, "session": refreshed })))
}

// POST /api/mabar/:id/participants/:pid/payment-proof
pub async fn upload_proof(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, participant_id)): Path<(i64, i64)>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let api = state.api_for(&headers);

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("payment_proof") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("bukti-pembayaran").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        file = Some(ProofFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let mut modal = ProofUploadModal::new(id, participant_id);
    let mut refreshed = None;
    let (api_ref, slot) = (&api, &mut refreshed);
    modal
        .submit(&api, file, move || async move {
            *slot = mabar::get(api_ref, id).await.ok();
        })
        .await?;

    Ok(Json(json!({ "open": modal.open, "session": refreshed })))
}

// GET /api/mabar/:id/manage
pub async fn manage(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (api, user) = acting_user(&state, &headers).await?;
    let editor = SessionEditor::new(hosted_session(&api, id, &user).await?);

    Ok(Json(json!({
        "session": editor.snapshot(),
        "stats": editor.stats(),
    })))
}

// POST /api/mabar/:id/edit
pub async fn edit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let (api, user) = acting_user(&state, &headers).await?;
    let mut editor = SessionEditor::new(hosted_session(&api, id, &user).await?);
    editor.enter_edit();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "cover_image" {
            let file_name = field.file_name().unwrap_or("cover").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            if !bytes.is_empty() {
                editor.replace_cover(FilePart {
                    field: name,
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.map_err(bad_multipart)?;
        let form = editor.form_mut();
        match name.as_str() {
            "title" => form.title = value,
            "description" => form.description = value,
            "payment_instructions" => form.payment_instructions = value,
            "slots_total" => {
                form.slots_total = value
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest("slots_total must be a number".to_string()))?
            }
            "price_per_slot" => {
                form.price_per_slot = value
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest("price_per_slot must be a number".to_string()))?
            }
            "remove_cover" if value == "1" || value == "true" => editor.remove_cover(),
            _ => {}
        }
    }

    editor.save(&api).await?;
    Ok(Json(json!({
        "session": editor.snapshot(),
        "stats": editor.stats(),
    })))
}
