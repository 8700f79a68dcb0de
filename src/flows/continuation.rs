use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::countdown::{remaining_seconds, Countdown};
use super::effects::{error_effects, Effect, ErrorPolicy, ToastLevel, BOOKING_LIST_PATH};
use crate::api::{ApiClient, ApiError};
use crate::models::{Booking, BookingStatus};
use crate::payment::{BridgeStatus, PaymentBridge, PaymentOutcome, PaymentWidget};
use crate::services::{bookings, payments};

pub const MABAR_CREATED_PATH: &str = "/my-mabar/?tab=created";

const MSG_MISSING_INVOICE: &str = "Invoice tidak ditemukan.";
const MSG_INVALID_INVOICE: &str = "Nomor invoice tidak valid.";
const MAX_INVOICE_LEN: usize = 64;
const MSG_NOT_PAYABLE: &str = "Booking ini sudah tidak menunggu pembayaran.";
const MSG_LOAD_FAILED: &str = "Gagal memuat detail booking.";
const MSG_TOKEN_FAILED: &str = "Gagal memproses pembayaran. Silakan coba lagi.";
const MSG_BRIDGE_FAILED: &str = "Sistem pembayaran gagal dimuat. Silakan muat ulang halaman.";
const MSG_SUCCESS: &str = "Pembayaran berhasil!";
const MSG_PENDING: &str = "Menunggu pembayaran Anda.";
const MSG_ERROR: &str = "Pembayaran gagal. Silakan coba lagi.";
const MSG_CLOSED: &str = "Anda menutup jendela pembayaran sebelum selesai.";

/// Where the user came from; decides the post-payment destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Direct,
    Mabar,
}

impl Source {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("mabar") => Source::Mabar,
            _ => Source::Direct,
        }
    }
}

/// Query string of the continuation page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContinuationParams {
    pub invoice: Option<String>,
    pub source: Option<String>,
}

/// `idle → requesting_token → awaiting_widget_result → idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPhase {
    Idle,
    RequestingToken,
    AwaitingWidgetResult,
}

/// Why a resume attempt was refused without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocked {
    BridgeLoading,
    BridgeFailed,
    Expired,
    WidgetUnavailable,
    Busy,
}

impl Blocked {
    pub fn effects(&self) -> Vec<Effect> {
        match self {
            Blocked::BridgeFailed => vec![Effect::toast(ToastLevel::Error, MSG_BRIDGE_FAILED)],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Readiness {
    pub bridge: BridgeStatus,
    pub widget_available: bool,
}

/// One mount of the "continue payment" page.
#[derive(Debug, Clone)]
pub struct ContinuationFlow {
    booking: Booking,
    source: Source,
    countdown: Countdown,
    phase: PaymentPhase,
}

impl ContinuationFlow {
    /// Validate the query, fetch the booking and start the countdown.
    pub async fn mount(
        api: &ApiClient,
        params: &ContinuationParams,
        now: DateTime<Utc>,
    ) -> Result<Self, Vec<Effect>> {
        let invoice = match params.invoice.as_deref().map(str::trim) {
            Some(inv) if !inv.is_empty() => inv.to_string(),
            _ => {
                return Err(vec![
                    Effect::toast(ToastLevel::Error, MSG_MISSING_INVOICE),
                    Effect::navigate(BOOKING_LIST_PATH),
                ])
            }
        };
        if !is_invoice_number(&invoice) {
            tracing::warn!(invoice = %invoice, "rejected malformed invoice");
            return Err(vec![
                Effect::toast(ToastLevel::Error, MSG_INVALID_INVOICE),
                Effect::navigate(BOOKING_LIST_PATH),
            ]);
        }

        let booking = bookings::find_by_invoice(api, &invoice).await.map_err(|e| {
            error_effects(
                &e,
                ErrorPolicy {
                    list_path: BOOKING_LIST_PATH,
                    fallback: MSG_LOAD_FAILED,
                    redirect_on_rejected: true,
                },
            )
        })?;

        if booking.status != BookingStatus::WaitingPayment {
            tracing::info!(invoice = %invoice, status = booking.status.as_str(), "booking not payable");
            return Err(vec![
                Effect::toast(ToastLevel::Info, MSG_NOT_PAYABLE),
                Effect::navigate(BOOKING_LIST_PATH),
            ]);
        }

        Ok(Self::from_booking(
            booking,
            Source::parse(params.source.as_deref()),
            now,
        ))
    }

    pub fn from_booking(booking: Booking, source: Source, now: DateTime<Utc>) -> Self {
        let remaining = remaining_seconds(booking.created_at, booking.remaining_seconds, now);
        Self {
            booking,
            source,
            countdown: Countdown::new(remaining),
            phase: PaymentPhase::Idle,
        }
    }

    pub fn invoice(&self) -> &str {
        &self.booking.invoice
    }

    pub fn booking(&self) -> &Booking {
        &self.booking
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn phase(&self) -> PaymentPhase {
        self.phase
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.countdown.remaining()
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        self.countdown.tick()
    }

    /// Past the deadline by more than `grace`; nothing on the page can use it any more.
    pub fn is_stale(&self, now: Instant, grace: Duration) -> bool {
        self.countdown.deadline() + grace <= now
    }

    /// Enter `requesting_token`, or say why not.
    pub fn begin(&mut self, readiness: Readiness) -> Result<(), Blocked> {
        if self.phase != PaymentPhase::Idle {
            return Err(Blocked::Busy);
        }
        match readiness.bridge {
            BridgeStatus::Ready => {}
            BridgeStatus::Failed => return Err(Blocked::BridgeFailed),
            BridgeStatus::Idle | BridgeStatus::Loading => return Err(Blocked::BridgeLoading),
        }
        if self.countdown.remaining() <= 0 {
            return Err(Blocked::Expired);
        }
        if !readiness.widget_available {
            return Err(Blocked::WidgetUnavailable);
        }
        self.phase = PaymentPhase::RequestingToken;
        Ok(())
    }

    pub fn token_issued(&mut self) {
        if self.phase == PaymentPhase::RequestingToken {
            self.phase = PaymentPhase::AwaitingWidgetResult;
        }
    }

    /// Back to idle. A 400 means the booking can no longer be paid.
    pub fn token_failed(&mut self, err: &ApiError) -> Vec<Effect> {
        self.phase = PaymentPhase::Idle;
        error_effects(
            err,
            ErrorPolicy {
                list_path: BOOKING_LIST_PATH,
                fallback: MSG_TOKEN_FAILED,
                redirect_on_rejected: true,
            },
        )
    }

    /// Turn a widget outcome into what the user sees next.
    pub fn resolve(&mut self, outcome: &PaymentOutcome) -> Vec<Effect> {
        if self.phase != PaymentPhase::AwaitingWidgetResult {
            tracing::warn!(invoice = %self.booking.invoice, phase = ?self.phase, "ignoring stale payment outcome");
            return Vec::new();
        }
        self.phase = PaymentPhase::Idle;

        tracing::info!(invoice = %self.booking.invoice, outcome = ?outcome, "payment widget finished");
        let invoice = urlencoding::encode(&self.booking.invoice);
        match outcome {
            PaymentOutcome::Success(_) => {
                let to = match self.source {
                    Source::Mabar => MABAR_CREATED_PATH.to_string(),
                    Source::Direct => format!("/payment/success?invoice={invoice}"),
                };
                vec![
                    Effect::toast(ToastLevel::Success, MSG_SUCCESS),
                    Effect::navigate(to),
                ]
            }
            PaymentOutcome::Pending(_) => vec![
                Effect::toast(ToastLevel::Info, MSG_PENDING),
                Effect::navigate(format!("/payment/pending?invoice={invoice}")),
            ],
            PaymentOutcome::Error(result) => vec![Effect::toast(
                ToastLevel::Error,
                result.status_message.as_deref().unwrap_or(MSG_ERROR),
            )],
            PaymentOutcome::Closed => vec![Effect::toast(ToastLevel::Warning, MSG_CLOSED)],
        }
    }

    /// Full resume: token, widget, resolution. No request is made unless the
    /// bridge is ready, time remains and a widget is present.
    pub async fn continue_payment(
        &mut self,
        api: &ApiClient,
        bridge: &PaymentBridge,
        widget: Option<&dyn PaymentWidget>,
    ) -> Vec<Effect> {
        let readiness = Readiness {
            bridge: bridge.status(),
            widget_available: widget.is_some(),
        };
        if let Err(blocked) = self.begin(readiness) {
            tracing::debug!(invoice = %self.booking.invoice, ?blocked, "resume payment blocked");
            return blocked.effects();
        }
        let Some(widget) = widget else {
            self.phase = PaymentPhase::Idle;
            return Vec::new();
        };

        let token = match payments::issue_token(api, &self.booking.invoice).await {
            Ok(t) => t,
            Err(e) => return self.token_failed(&e),
        };
        self.token_issued();

        let outcome = widget.pay(&token.token).await;
        self.resolve(&outcome)
    }
}

/// Invoice numbers are a single path segment of letters, digits, `-` and `_`.
fn is_invoice_number(s: &str) -> bool {
    s.len() <= MAX_INVOICE_LEN
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
