use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::continuation::{ContinuationFlow, Source};
use super::effects::{error_effects, Effect, ErrorPolicy, ToastLevel};
use crate::api::ApiClient;
use crate::models::{Field, NewBooking};
use crate::payment::{PaymentBridge, PaymentWidget};
use crate::services::{bookings, fields};

const MSG_CREATE_FAILED: &str = "Gagal membuat booking. Silakan coba lagi.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Pilih minimal satu jam.")]
    NoSlots,

    #[error("Jam {0} dipilih lebih dari sekali.")]
    DuplicateSlot(String),

    #[error("Tanggal booking sudah lewat.")]
    PastDate,

    #[error("Lapangan sedang tidak tersedia.")]
    FieldUnavailable,

    #[error("Jam {0} sudah dibooking.")]
    SlotTaken(String),
}

/// Guest details for a booking made on someone else's behalf.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestContact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub field: Field,
    pub date: NaiveDate,
    pub slots: Vec<String>,
    pub guest: GuestContact,
}

impl BookingDraft {
    pub fn validate(&self, today: NaiveDate) -> Result<(), DraftError> {
        if !self.field.is_bookable() {
            return Err(DraftError::FieldUnavailable);
        }
        if self.slots.is_empty() {
            return Err(DraftError::NoSlots);
        }
        if self.date < today {
            return Err(DraftError::PastDate);
        }
        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !seen.insert(slot.as_str()) {
                return Err(DraftError::DuplicateSlot(slot.clone()));
            }
        }
        Ok(())
    }

    /// Slot count times the field's rate for the chosen day.
    pub fn total(&self) -> i64 {
        self.slots.len() as i64 * self.field.price_for(self.date)
    }

    fn to_request(&self) -> NewBooking {
        let mut slots = self.slots.clone();
        slots.sort();
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        NewBooking {
            field_id: self.field.id,
            booking_date: self.date,
            time_slots: slots,
            customer_name: clean(&self.guest.name),
            customer_phone: clean(&self.guest.phone),
        }
    }
}

/// Validate against the field's current bookings and create the booking.
pub async fn place(
    api: &ApiClient,
    draft: &BookingDraft,
    source: Source,
    now: DateTime<Utc>,
) -> Result<ContinuationFlow, Vec<Effect>> {
    let reject = |e: DraftError| vec![Effect::toast(ToastLevel::Warning, e.to_string())];
    let policy = ErrorPolicy {
        list_path: "/",
        fallback: MSG_CREATE_FAILED,
        redirect_on_rejected: false,
    };

    draft.validate(now.date_naive()).map_err(reject)?;

    let taken = fields::booked_slots(api, draft.field.id, draft.date)
        .await
        .map_err(|e| error_effects(&e, policy))?;
    if let Some(slot) = draft.slots.iter().find(|s| taken.contains(s)) {
        return Err(reject(DraftError::SlotTaken(slot.clone())));
    }

    let booking = bookings::create(api, &draft.to_request())
        .await
        .map_err(|e| error_effects(&e, policy))?;
    tracing::info!(
        invoice = %booking.invoice,
        field_id = draft.field.id,
        total = draft.total(),
        "booking created"
    );

    Ok(ContinuationFlow::from_booking(booking, source, now))
}

/// Create the booking and go straight into payment.
pub async fn checkout(
    api: &ApiClient,
    draft: &BookingDraft,
    bridge: &PaymentBridge,
    widget: Option<&dyn PaymentWidget>,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    match place(api, draft, Source::Direct, now).await {
        Ok(mut flow) => flow.continue_payment(api, bridge, widget).await,
        Err(effects) => effects,
    }
}
