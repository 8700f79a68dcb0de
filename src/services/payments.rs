use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError, Method};
use crate::models::Envelope;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentToken {
    pub token: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Ask the backend for a fresh checkout token for an unpaid booking.
pub async fn issue_token(api: &ApiClient, invoice: &str) -> Result<PaymentToken, ApiError> {
    let invoice = urlencoding::encode(invoice);
    let env: Envelope<PaymentToken> = api
        .send_json(
            Method::Post,
            &format!("/payments/{invoice}/token"),
            serde_json::json!({}),
        )
        .await?;
    Ok(env.data)
}
