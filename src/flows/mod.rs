pub mod checkout;
pub mod continuation;
pub mod countdown;
pub mod editor;
pub mod effects;
pub mod join;
pub mod moderation;
pub mod proof;

pub use effects::{Effect, ToastLevel};
