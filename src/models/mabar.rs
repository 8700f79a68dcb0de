use serde::{Deserialize, Serialize};

use super::{Booking, BookingStatus, User};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MabarType {
    OpenPlay,
    MiniTournament,
    TeamChallenge,
}

impl MabarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MabarType::OpenPlay => "open_play",
            MabarType::MiniTournament => "mini_tournament",
            MabarType::TeamChallenge => "team_challenge",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    AwaitingApproval,
    Pending,
    Approved,
    Rejected,
    WaitingPayment,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("participant cannot move from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: ParticipantStatus,
    pub to: ParticipantStatus,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::AwaitingApproval => "awaiting_approval",
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Approved => "approved",
            ParticipantStatus::Rejected => "rejected",
            ParticipantStatus::WaitingPayment => "waiting_payment",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ParticipantStatus::Rejected)
    }

    /// Still waiting on a host decision or a payment check.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ParticipantStatus::AwaitingApproval
                | ParticipantStatus::Pending
                | ParticipantStatus::WaitingPayment
        )
    }

    pub fn transition(self, to: ParticipantStatus) -> Result<ParticipantStatus, TransitionError> {
        use ParticipantStatus::*;
        let allowed = match self {
            AwaitingApproval | Pending => matches!(to, Approved | Rejected),
            Approved => matches!(to, WaitingPayment),
            WaitingPayment => matches!(to, Approved | Rejected),
            Rejected => false,
        };
        if allowed {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MabarParticipant {
    pub id: i64,
    pub status: ParticipantStatus,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default)]
    pub payment_proof: Option<String>,
}

impl MabarParticipant {
    pub fn is_guest(&self) -> bool {
        self.user.is_none()
    }

    pub fn display_name(&self) -> &str {
        match (&self.user, &self.guest_name) {
            (Some(user), _) => &user.name,
            (None, Some(name)) => name,
            (None, None) => "Tamu",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MabarSession {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub mabar_type: MabarType,
    pub slots_total: u32,
    pub price_per_slot: i64,
    #[serde(default)]
    pub payment_instructions: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub host: User,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub participants: Vec<MabarParticipant>,
    #[serde(default)]
    pub booking: Option<Booking>,
}

impl MabarSession {
    pub fn approved_count(&self) -> u32 {
        self.participants
            .iter()
            .filter(|p| p.status == ParticipantStatus::Approved)
            .count() as u32
    }

    pub fn available_slots(&self) -> u32 {
        self.slots_total.saturating_sub(self.approved_count())
    }

    pub fn is_full(&self) -> bool {
        self.available_slots() == 0
    }

    pub fn is_host(&self, user_id: i64) -> bool {
        self.host.id == user_id
    }

    /// Joinable only while the underlying booking is paid or still payable.
    pub fn is_usable(&self) -> bool {
        match &self.booking {
            Some(b) => matches!(
                b.status,
                BookingStatus::Active | BookingStatus::WaitingPayment
            ),
            None => true,
        }
    }

    pub fn participant(&self, participant_id: i64) -> Option<&MabarParticipant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }
}

/// Which list the "my mabar" page is showing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MabarTab {
    Created,
    Joined,
}

impl MabarTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            MabarTab::Created => "created",
            MabarTab::Joined => "joined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMabarSession {
    pub booking_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub mabar_type: MabarType,
    pub slots_total: u32,
    pub price_per_slot: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Backend acknowledgement of a join; an `id` means a participant record exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<ParticipantStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::Role;

    pub fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            address: None,
            avatar: None,
            roles: vec![Role::User],
        }
    }

    pub fn participant(id: i64, status: ParticipantStatus) -> MabarParticipant {
        MabarParticipant {
            id,
            status,
            user: Some(user(100 + id, &format!("Player{id}"))),
            guest_name: None,
            guest_phone: None,
            payment_proof: None,
        }
    }

    pub fn session(slots_total: u32, statuses: &[ParticipantStatus]) -> MabarSession {
        MabarSession {
            id: 1,
            title: "Futsal Kamis Malam".to_string(),
            description: Some("Main santai".to_string()),
            mabar_type: MabarType::OpenPlay,
            slots_total,
            price_per_slot: 25_000,
            payment_instructions: Some("Transfer BCA 123".to_string()),
            cover_image: None,
            host: user(1, "Host"),
            participant_count: statuses.len() as u32,
            participants: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| participant(i as i64 + 1, *s))
                .collect(),
            booking: None,
        }
    }
}
