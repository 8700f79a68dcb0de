use std::future::Future;

use serde::{Deserialize, Serialize};

use super::effects::{Effect, ToastLevel, LOGIN_PATH};
use crate::api::{ApiClient, ErrorKind};
use crate::models::{JoinRequest, MabarSession};
use crate::services::mabar;

pub const MSG_ALREADY_JOINED: &str = "Anda sudah terdaftar di sesi ini";
pub const MSG_SESSION_FULL: &str = "Sesi ini sudah penuh";
const MSG_JOIN_FAILED: &str = "Gagal bergabung ke sesi. Silakan coba lagi.";
const MSG_JOINED: &str = "Permintaan bergabung terkirim. Tunggu persetujuan host.";
const MSG_TERMS: &str = "Anda harus menyetujui syarat dan ketentuan.";
const MSG_LOGIN_FIRST: &str = "Silakan login untuk bergabung.";
const MSG_CONTACT: &str = "Nama, nomor telepon, dan email wajib diisi.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub agreed_terms: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStep {
    Form,
    Confirmation,
}

/// Reasons the join button stays disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinBlocked {
    NotAuthenticated,
    TermsNotAccepted,
    MissingContact,
    SessionFull,
}

impl JoinBlocked {
    fn effects(&self) -> Vec<Effect> {
        match self {
            JoinBlocked::NotAuthenticated => vec![
                Effect::toast(ToastLevel::Warning, MSG_LOGIN_FIRST),
                Effect::navigate(LOGIN_PATH),
            ],
            JoinBlocked::TermsNotAccepted => vec![Effect::toast(ToastLevel::Warning, MSG_TERMS)],
            JoinBlocked::MissingContact => vec![Effect::toast(ToastLevel::Warning, MSG_CONTACT)],
            JoinBlocked::SessionFull => vec![Effect::toast(ToastLevel::Warning, MSG_SESSION_FULL)],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JoinContext {
    pub authenticated: bool,
    pub available_slots: u32,
}

impl JoinContext {
    pub fn for_session(session: &MabarSession, authenticated: bool) -> Self {
        Self {
            authenticated,
            available_slots: session.available_slots(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub step: JoinStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<i64>,
    pub effects: Vec<Effect>,
}

impl JoinOutcome {
    fn stay(effects: Vec<Effect>) -> Self {
        Self {
            step: JoinStep::Form,
            participant_id: None,
            effects,
        }
    }
}

pub fn can_submit(form: &JoinForm, ctx: JoinContext) -> Result<(), JoinBlocked> {
    if !ctx.authenticated {
        return Err(JoinBlocked::NotAuthenticated);
    }
    if ctx.available_slots == 0 {
        return Err(JoinBlocked::SessionFull);
    }
    if !form.agreed_terms {
        return Err(JoinBlocked::TermsNotAccepted);
    }
    if [&form.name, &form.phone, &form.email]
        .iter()
        .any(|v| v.trim().is_empty())
    {
        return Err(JoinBlocked::MissingContact);
    }
    Ok(())
}

/// Send a join request; `on_joined` runs only after the backend created a record.
pub async fn submit<F, Fut>(
    api: &ApiClient,
    session_id: i64,
    form: &JoinForm,
    ctx: JoinContext,
    on_joined: F,
) -> JoinOutcome
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if let Err(blocked) = can_submit(form, ctx) {
        return JoinOutcome::stay(blocked.effects());
    }

    let request = JoinRequest {
        name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        email: form.email.trim().to_string(),
    };

    match mabar::join(api, session_id, &request).await {
        Ok(receipt) => match receipt.id {
            Some(id) => {
                tracing::info!(session_id, participant_id = id, "joined mabar session");
                on_joined().await;
                JoinOutcome {
                    step: JoinStep::Confirmation,
                    participant_id: Some(id),
                    effects: vec![Effect::toast(ToastLevel::Success, MSG_JOINED)],
                }
            }
            None => {
                tracing::warn!(session_id, "join acknowledged without participant id");
                JoinOutcome::stay(vec![Effect::toast(ToastLevel::Error, MSG_JOIN_FAILED)])
            }
        },
        Err(e) => {
            tracing::warn!(session_id, error = %e, "join request failed");
            let effects = match (e.status(), e.kind()) {
                (Some(409), _) => vec![Effect::toast(ToastLevel::Error, MSG_ALREADY_JOINED)],
                (Some(400), _) => vec![Effect::toast(
                    ToastLevel::Error,
                    e.server_message().unwrap_or(MSG_SESSION_FULL),
                )],
                (_, ErrorKind::Unauthenticated) => JoinBlocked::NotAuthenticated.effects(),
                _ => vec![Effect::toast(ToastLevel::Error, MSG_JOIN_FAILED)],
            };
            JoinOutcome::stay(effects)
        }
    }
}
