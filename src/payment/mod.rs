pub mod bridge;
pub mod widget;

pub use bridge::{BridgeStatus, HtmlHead, PaymentBridge, ScriptHost, ScriptLoadError, ScriptTag};
pub use widget::{PaymentOutcome, PaymentWidget, WidgetResult};
