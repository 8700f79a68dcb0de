use std::env;

const SNAP_SANDBOX_URL: &str = "https://app.sandbox.midtrans.com/snap/snap.js";
const SNAP_PRODUCTION_URL: &str = "https://app.midtrans.com/snap/snap.js";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub payment_client_key: String,
    pub payment_is_production: bool,
    pub app_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            api_timeout_secs: env::var("API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            payment_client_key: env::var("PAYMENT_CLIENT_KEY").unwrap_or_default(),
            payment_is_production: env::var("PAYMENT_IS_PRODUCTION")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            app_key: env::var("APP_KEY").unwrap_or_default(),
        }
    }

    /// Checkout script for the configured environment.
    pub fn payment_script_url(&self) -> &'static str {
        if self.payment_is_production {
            SNAP_PRODUCTION_URL
        } else {
            SNAP_SANDBOX_URL
        }
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
