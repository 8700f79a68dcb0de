use std::future::Future;

use serde::{Deserialize, Serialize};

use super::effects::{error_effects, Effect, ErrorPolicy, ToastLevel};
use crate::api::{ApiClient, ApiError};
use crate::models::{MabarSession, ParticipantStatus, TransitionError};
use crate::services::mabar;

const MANAGE_LIST_PATH: &str = "/my-mabar/?tab=created";
const JOINED_LIST_PATH: &str = "/my-mabar/?tab=joined";
const MSG_ACTION_FAILED: &str = "Gagal memperbarui peserta. Silakan coba lagi.";
const MSG_NOT_PARTICIPANT: &str = "Anda tidak terdaftar aktif di sesi ini.";
const MSG_LEFT: &str = "Anda keluar dari sesi ini.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostAction {
    Approve,
    Reject,
    Remove,
}

impl HostAction {
    pub fn prompt(&self, name: &str) -> String {
        match self {
            HostAction::Approve => format!("Setujui {name} sebagai peserta?"),
            HostAction::Reject => format!(
                "Tolak {name}? Bukti pembayaran yang sudah diunggah akan dihapus."
            ),
            HostAction::Remove => format!("Keluarkan {name} dari sesi ini?"),
        }
    }

    fn target(&self) -> Option<ParticipantStatus> {
        match self {
            HostAction::Approve => Some(ParticipantStatus::Approved),
            HostAction::Reject => Some(ParticipantStatus::Rejected),
            HostAction::Remove => None,
        }
    }

    fn done_message(&self) -> &'static str {
        match self {
            HostAction::Approve => "Peserta disetujui.",
            HostAction::Reject => "Peserta ditolak.",
            HostAction::Remove => "Peserta dikeluarkan.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("only the host can moderate this session")]
    NotHost,

    #[error("participant {0} not found")]
    UnknownParticipant(i64),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// A host action waiting for the host to confirm it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationRequest {
    pub session_id: i64,
    pub participant_id: i64,
    pub action: HostAction,
    pub prompt: String,
}

impl ConfirmationRequest {
    pub fn confirm(self) -> ConfirmedAction {
        ConfirmedAction {
            session_id: self.session_id,
            participant_id: self.participant_id,
            action: self.action,
        }
    }
}

/// Only obtainable through [`ConfirmationRequest::confirm`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfirmedAction {
    session_id: i64,
    participant_id: i64,
    action: HostAction,
}

impl ConfirmedAction {
    pub fn action(&self) -> HostAction {
        self.action
    }
}

/// Check the action against the loaded session and build its confirmation prompt.
pub fn request(
    session: &MabarSession,
    acting_user_id: i64,
    participant_id: i64,
    action: HostAction,
) -> Result<ConfirmationRequest, ModerationError> {
    if !session.is_host(acting_user_id) {
        return Err(ModerationError::NotHost);
    }
    let participant = session
        .participant(participant_id)
        .ok_or(ModerationError::UnknownParticipant(participant_id))?;
    if let Some(target) = action.target() {
        participant.status.transition(target)?;
    }

    Ok(ConfirmationRequest {
        session_id: session.id,
        participant_id,
        action,
        prompt: action.prompt(participant.display_name()),
    })
}

/// Send a confirmed action, then let the caller reload the session.
pub async fn execute<F, Fut>(api: &ApiClient, confirmed: ConfirmedAction, refresh: F) -> Vec<Effect>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let ConfirmedAction {
        session_id,
        participant_id,
        action,
    } = confirmed;

    let result = match action {
        HostAction::Approve => mabar::approve(api, session_id, participant_id).await,
        HostAction::Reject => mabar::reject(api, session_id, participant_id).await,
        HostAction::Remove => mabar::remove(api, session_id, participant_id).await,
    };

    match result {
        Ok(()) => {
            tracing::info!(session_id, participant_id, ?action, "participant moderated");
            refresh().await;
            vec![Effect::toast(ToastLevel::Success, action.done_message())]
        }
        Err(e) => error_effects(
            &e,
            ErrorPolicy {
                list_path: MANAGE_LIST_PATH,
                fallback: MSG_ACTION_FAILED,
                redirect_on_rejected: false,
            },
        ),
    }
}

/// Participant leaves a session they joined.
pub async fn cancel_participation<F, Fut>(
    api: &ApiClient,
    session: &MabarSession,
    user_id: i64,
    refresh: F,
) -> Vec<Effect>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let mine = session
        .participants
        .iter()
        .find(|p| p.user.as_ref().map(|u| u.id) == Some(user_id));
    match mine {
        Some(p) if !p.status.is_terminal() => {}
        _ => return vec![Effect::toast(ToastLevel::Warning, MSG_NOT_PARTICIPANT)],
    }

    match mabar::cancel_participation(api, session.id).await {
        Ok(()) => {
            tracing::info!(session_id = session.id, user_id, "participation cancelled");
            refresh().await;
            vec![Effect::toast(ToastLevel::Success, MSG_LEFT)]
        }
        Err(e) => error_effects(
            &e,
            ErrorPolicy {
                list_path: JOINED_LIST_PATH,
                fallback: MSG_ACTION_FAILED,
                redirect_on_rejected: false,
            },
        ),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GuestError {
    #[error("guest name is required")]
    EmptyName,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// "Add guest" dialog. Closes only when the backend accepted the guest.
#[derive(Debug, Clone, Default)]
pub struct GuestModal {
    pub open: bool,
    pub name: String,
}

impl GuestModal {
    pub fn open(&mut self) {
        self.open = true;
        self.name.clear();
    }

    pub async fn submit<F, Fut>(
        &mut self,
        api: &ApiClient,
        session_id: i64,
        refresh: F,
    ) -> Result<(), GuestError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(GuestError::EmptyName);
        }
        mabar::add_guest(api, session_id, name).await?;
        tracing::info!(session_id, "guest participant added");
        refresh().await;
        self.open = false;
        self.name.clear();
        Ok(())
    }
}
