use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ErrorKind};

pub const BOOKING_LIST_PATH: &str = "/my-booking";
pub const LOGIN_PATH: &str = "/login";

const MSG_UNAUTHENTICATED: &str = "Sesi Anda telah berakhir. Silakan login kembali.";
const MSG_FORBIDDEN: &str = "Anda tidak memiliki akses ke halaman ini.";
const MSG_NOT_FOUND: &str = "Data tidak ditemukan.";
const MSG_TRANSIENT: &str = "Terjadi kesalahan. Silakan coba lagi.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Instruction for the browser shell: show a toast or change page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Toast {
        level: ToastLevel,
        message: String,
    },
    Navigate {
        to: String,
        #[serde(default)]
        delay_ms: u64,
    },
}

impl Effect {
    pub fn toast(level: ToastLevel, message: impl Into<String>) -> Self {
        Effect::Toast {
            level,
            message: message.into(),
        }
    }

    pub fn navigate(to: impl Into<String>) -> Self {
        Effect::Navigate {
            to: to.into(),
            delay_ms: 0,
        }
    }

    pub fn navigate_after(to: impl Into<String>, delay_ms: u64) -> Self {
        Effect::Navigate {
            to: to.into(),
            delay_ms,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Effect::Navigate { .. })
    }
}

/// How a call site wants API failures surfaced.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPolicy<'a> {
    /// Where to send the user when the resource is gone or off-limits.
    pub list_path: &'a str,
    /// Toast text when the backend gives no usable message.
    pub fallback: &'a str,
    /// Whether a 400/422 means the resource is no longer usable.
    pub redirect_on_rejected: bool,
}

/// Map a backend failure onto the toast + optional redirect the user sees.
pub fn error_effects(err: &ApiError, policy: ErrorPolicy<'_>) -> Vec<Effect> {
    tracing::warn!(error = %err, status = ?err.status(), "request failed");

    match err.kind() {
        ErrorKind::Unauthenticated => vec![
            Effect::toast(ToastLevel::Error, MSG_UNAUTHENTICATED),
            Effect::navigate(LOGIN_PATH),
        ],
        ErrorKind::Forbidden => vec![
            Effect::toast(ToastLevel::Error, MSG_FORBIDDEN),
            Effect::navigate(policy.list_path),
        ],
        ErrorKind::NotFound => vec![
            Effect::toast(ToastLevel::Error, MSG_NOT_FOUND),
            Effect::navigate(policy.list_path),
        ],
        ErrorKind::Conflict => vec![Effect::toast(
            ToastLevel::Error,
            err.server_message().unwrap_or(policy.fallback),
        )],
        ErrorKind::Rejected => {
            let mut effects = vec![Effect::toast(
                ToastLevel::Error,
                err.server_message().unwrap_or(policy.fallback),
            )];
            if policy.redirect_on_rejected {
                effects.push(Effect::navigate(policy.list_path));
            }
            effects
        }
        ErrorKind::Transient => vec![Effect::toast(ToastLevel::Error, MSG_TRANSIENT)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(redirect: bool) -> ErrorPolicy<'static> {
        ErrorPolicy {
            list_path: BOOKING_LIST_PATH,
            fallback: "Gagal",
            redirect_on_rejected: redirect,
        }
    }

    fn status(status: u16, message: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        let effects = error_effects(&status(401, None), policy(false));
        assert_eq!(effects[1], Effect::navigate(LOGIN_PATH));
    }

    #[test]
    fn test_rejected_prefers_server_message() {
        let effects = error_effects(&status(400, Some("Booking kedaluwarsa")), policy(true));
        assert_eq!(
            effects,
            vec![
                Effect::toast(ToastLevel::Error, "Booking kedaluwarsa"),
                Effect::navigate(BOOKING_LIST_PATH),
            ]
        );
    }

    #[test]
    fn test_transient_never_redirects() {
        let effects = error_effects(&ApiError::Transport("reset".into()), policy(true));
        assert_eq!(effects.len(), 1);
        assert!(!effects[0].is_navigation());
    }

    #[test]
    fn test_effect_json_shape() {
        let json = serde_json::to_value(Effect::navigate_after("/my-booking", 3000)).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["to"], "/my-booking");
        assert_eq!(json["delay_ms"], 3000);
    }
}
