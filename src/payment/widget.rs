use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the checkout widget reports back with each callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WidgetResult {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// The four ways a widget session can end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success(WidgetResult),
    Pending(WidgetResult),
    Error(WidgetResult),
    Closed,
}

/// Opaque third-party checkout. Opened with a token, resolves with an outcome.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn pay(&self, token: &str) -> PaymentOutcome;
}
