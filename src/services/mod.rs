pub mod auth;
pub mod bookings;
pub mod categories;
pub mod dashboard;
pub mod fields;
pub mod mabar;
pub mod payments;
pub mod users;
