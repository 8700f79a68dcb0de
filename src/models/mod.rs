pub mod booking;
pub mod dashboard;
pub mod field;
pub mod mabar;
pub mod pagination;
pub mod user;

pub use booking::{Booking, BookingStatus, BookingStatusInfo, NewBooking};
pub use dashboard::DashboardStats;
pub use field::{CategoryInput, Field, FieldInput, FieldStatus, SportCategory};
pub use mabar::{
    JoinReceipt, JoinRequest, MabarParticipant, MabarSession, MabarTab, MabarType,
    NewMabarSession, ParticipantStatus, TransitionError,
};
pub use pagination::{Envelope, PageLinks, PageMeta, PageQuery, Paginated, SortDirection};
pub use user::{ProfileUpdate, Role, User};
