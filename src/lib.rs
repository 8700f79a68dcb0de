pub mod api;
pub mod config;
pub mod errors;
pub mod flows;
pub mod handlers;
pub mod models;
pub mod payment;
pub mod services;
pub mod session;
pub mod state;
