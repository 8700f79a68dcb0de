use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Field, User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub invoice: String,
    pub status: BookingStatus,
    pub booking_date: NaiveDate,
    #[serde(default)]
    pub time_slots: Vec<String>,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub field: Option<Field>,
    /// Seconds left to pay, when the backend computes it.
    #[serde(default)]
    pub remaining_seconds: Option<i64>,
}

impl Booking {
    /// Slots in chronological order ("HH:MM" sorts lexically).
    pub fn ordered_slots(&self) -> Vec<String> {
        let mut slots = self.time_slots.clone();
        slots.sort();
        slots.dedup();
        slots
    }

    pub fn is_guest_booking(&self) -> bool {
        self.user.is_none() && self.customer_name.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    WaitingPayment,
    Active,
    Failed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::WaitingPayment => "waiting_payment",
            BookingStatus::Active => "active",
            BookingStatus::Failed => "failed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::WaitingPayment)
    }

    /// Status only moves out of `waiting_payment`, never back.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(self, BookingStatus::WaitingPayment) && next != BookingStatus::WaitingPayment
    }
}

/// Answer of the invoice status lookup used by the pending page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingStatusInfo {
    pub invoice: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub field_id: i64,
    pub booking_date: NaiveDate,
    pub time_slots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_waiting_payment_is_open() {
        assert!(!BookingStatus::WaitingPayment.is_terminal());
        assert!(BookingStatus::Active.is_terminal());
        assert!(BookingStatus::Failed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_transitions_are_monotonic() {
        assert!(BookingStatus::WaitingPayment.can_transition_to(BookingStatus::Active));
        assert!(BookingStatus::WaitingPayment.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::WaitingPayment.can_transition_to(BookingStatus::WaitingPayment));
        assert!(!BookingStatus::Active.can_transition_to(BookingStatus::WaitingPayment));
        assert!(!BookingStatus::Failed.can_transition_to(BookingStatus::Active));
    }

    #[test]
    fn test_deserialize_backend_booking() {
        let json = r#"{
            "id": 7,
            "invoice": "INV-001",
            "status": "waiting_payment",
            "booking_date": "2025-06-16",
            "time_slots": ["10:00", "08:00", "09:00"],
            "price": 300000,
            "created_at": "2025-06-15T10:00:00Z"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.status, BookingStatus::WaitingPayment);
        assert_eq!(booking.ordered_slots(), vec!["08:00", "09:00", "10:00"]);
        assert_eq!(booking.remaining_seconds, None);
        assert!(!booking.is_guest_booking());
    }
}
