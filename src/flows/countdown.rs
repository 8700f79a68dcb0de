use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;

use super::effects::{Effect, ToastLevel, BOOKING_LIST_PATH};

/// How long a `waiting_payment` booking stays payable.
pub const PAYMENT_WINDOW_SECS: i64 = 15 * 60;
pub const EXPIRY_REDIRECT_DELAY_MS: u64 = 3000;

const MSG_EXPIRED: &str = "Waktu pembayaran telah habis.";

/// Seconds left to pay, never negative and never beyond the payment window.
///
/// A server-supplied value is used only when it lies inside the window; anything
/// larger comes from skewed clocks or stale data and is recomputed from
/// `created_at`.
pub fn remaining_seconds(
    created_at: DateTime<Utc>,
    server_remaining: Option<i64>,
    now: DateTime<Utc>,
) -> i64 {
    match server_remaining {
        Some(secs) if secs <= PAYMENT_WINDOW_SECS => secs.max(0),
        _ => {
            let elapsed = (now - created_at).num_seconds();
            (PAYMENT_WINDOW_SECS - elapsed).clamp(0, PAYMENT_WINDOW_SECS)
        }
    }
}

/// `MM:SS`.
pub fn format_remaining(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Payment window measured against a fixed deadline on the monotonic clock.
#[derive(Debug, Clone)]
pub struct Countdown {
    deadline: Instant,
    expired: bool,
}

impl Countdown {
    pub fn new(remaining: i64) -> Self {
        Self::starting_at(remaining, Instant::now())
    }

    pub fn starting_at(remaining: i64, now: Instant) -> Self {
        Self {
            deadline: deadline_from(remaining, now),
            expired: false,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> i64 {
        self.remaining_at(Instant::now())
    }

    /// Whole seconds left at `now`, rounded up so the display reaches 00:00 at the deadline.
    pub fn remaining_at(&self, now: Instant) -> i64 {
        let left = self.deadline.saturating_duration_since(now);
        let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        i64::try_from(secs).unwrap_or(PAYMENT_WINDOW_SECS)
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        self.tick_at(Instant::now())
    }

    /// Returns the expiry effects exactly once, on the first check at or past the deadline.
    pub fn tick_at(&mut self, now: Instant) -> Vec<Effect> {
        if self.expired || self.remaining_at(now) > 0 {
            return Vec::new();
        }

        self.expired = true;
        tracing::info!("payment window expired");
        vec![
            Effect::toast(ToastLevel::Warning, MSG_EXPIRED),
            Effect::navigate_after(BOOKING_LIST_PATH, EXPIRY_REDIRECT_DELAY_MS),
        ]
    }
}

fn deadline_from(remaining: i64, now: Instant) -> Instant {
    let secs = u64::try_from(remaining.clamp(0, PAYMENT_WINDOW_SECS)).unwrap_or(0);
    now + Duration::from_secs(secs)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountdownFrame {
    pub remaining_seconds: i64,
    pub display: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl CountdownFrame {
    pub fn of(countdown: &Countdown, effects: Vec<Effect>) -> Self {
        let remaining_seconds = countdown.remaining();
        Self {
            remaining_seconds,
            display: format_remaining(remaining_seconds),
            effects,
        }
    }
}

/// Drive a tick source once per `period` until the window closes.
///
/// `tick` is called for every period and returns the frame to publish, or `None`
/// when the countdown it drives is gone. The task stops after the first frame at
/// zero, when the returned stream is dropped, or when the handle is aborted.
pub fn spawn_timer<F>(period: Duration, mut tick: F) -> (ReceiverStream<CountdownFrame>, AbortHandle)
where
    F: FnMut() -> Option<CountdownFrame> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(4);
    let task = tokio::spawn(async move {
        let start = Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        loop {
            interval.tick().await;
            let Some(frame) = tick() else { break };
            let done = frame.remaining_seconds <= 0;
            if tx.send(frame).await.is_err() || done {
                break;
            }
        }
    });
    (ReceiverStream::new(rx), task.abort_handle())
}
