use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

pub const SCRIPT_ID: &str = "payment-snap-script";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
    pub client_key: String,
}

impl ScriptTag {
    pub fn to_html(&self) -> String {
        format!(
            r#"<script id="{}" src="{}" data-client-key="{}"></script>"#,
            escape_attr(&self.id),
            escape_attr(&self.src),
            escape_attr(&self.client_key),
        )
    }
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load {src}: {reason}")]
pub struct ScriptLoadError {
    pub src: String,
    pub reason: String,
}

/// The page the checkout script is injected into.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    fn has_script(&self, id: &str) -> bool;
    async fn load(&self, tag: &ScriptTag) -> Result<(), ScriptLoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl BridgeStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, BridgeStatus::Ready)
    }

    /// True until the script either loads or fails.
    pub fn is_loading(&self) -> bool {
        matches!(self, BridgeStatus::Idle | BridgeStatus::Loading)
    }
}

/// Makes the checkout script available at most once per page.
#[derive(Debug, Clone)]
pub struct PaymentBridge {
    tag: ScriptTag,
    status: BridgeStatus,
}

impl PaymentBridge {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_tag(ScriptTag {
            id: SCRIPT_ID.to_string(),
            src: config.payment_script_url().to_string(),
            client_key: config.payment_client_key.clone(),
        })
    }

    pub fn with_tag(tag: ScriptTag) -> Self {
        Self {
            tag,
            status: BridgeStatus::Idle,
        }
    }

    pub fn tag(&self) -> &ScriptTag {
        &self.tag
    }

    pub fn status(&self) -> BridgeStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Inject the script unless the page already has it. A failed load is final
    /// for this page; the user has to reload.
    pub async fn ensure_loaded(&mut self, host: &dyn ScriptHost) -> BridgeStatus {
        if self.status != BridgeStatus::Idle {
            return self.status;
        }
        if host.has_script(&self.tag.id) {
            self.status = BridgeStatus::Ready;
            return self.status;
        }

        self.status = BridgeStatus::Loading;
        self.status = match host.load(&self.tag).await {
            Ok(()) => BridgeStatus::Ready,
            Err(e) => {
                tracing::warn!(error = %e, "payment script failed to load");
                BridgeStatus::Failed
            }
        };
        self.status
    }
}

/// Script tags collected for a server-rendered page head.
#[derive(Debug, Default)]
pub struct HtmlHead {
    scripts: Mutex<Vec<ScriptTag>>,
}

impl HtmlHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        self.scripts
            .lock()
            .map(|s| s.iter().map(ScriptTag::to_html).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScriptHost for HtmlHead {
    fn has_script(&self, id: &str) -> bool {
        self.scripts
            .lock()
            .map(|s| s.iter().any(|t| t.id == id))
            .unwrap_or(false)
    }

    async fn load(&self, tag: &ScriptTag) -> Result<(), ScriptLoadError> {
        let mut scripts = self.scripts.lock().map_err(|e| ScriptLoadError {
            src: tag.src.clone(),
            reason: e.to_string(),
        })?;
        scripts.push(tag.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeHost {
        present: bool,
        fail: bool,
        loads: AtomicUsize,
    }

    impl FakeHost {
        fn new(present: bool, fail: bool) -> Self {
            Self {
                present,
                fail,
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ScriptHost for FakeHost {
        fn has_script(&self, _id: &str) -> bool {
            self.present
        }

        async fn load(&self, tag: &ScriptTag) -> Result<(), ScriptLoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ScriptLoadError {
                    src: tag.src.clone(),
                    reason: "network".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn bridge() -> PaymentBridge {
        PaymentBridge::with_tag(ScriptTag {
            id: SCRIPT_ID.to_string(),
            src: "https://app.sandbox.midtrans.com/snap/snap.js".to_string(),
            client_key: "SB-key".to_string(),
        })
    }

    #[tokio::test]
    async fn test_loads_once() {
        let host = FakeHost::new(false, false);
        let mut b = bridge();
        assert!(b.is_loading());
        assert_eq!(b.ensure_loaded(&host).await, BridgeStatus::Ready);
        assert_eq!(b.ensure_loaded(&host).await, BridgeStatus::Ready);
        assert_eq!(host.loads.load(Ordering::SeqCst), 1);
        assert!(!b.is_loading());
    }

    #[tokio::test]
    async fn test_existing_tag_is_ready_without_injecting() {
        let host = FakeHost::new(true, false);
        let mut b = bridge();
        assert!(b.ensure_loaded(&host).await.is_ready());
        assert_eq!(host.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_is_permanent() {
        let host = FakeHost::new(false, true);
        let mut b = bridge();
        assert_eq!(b.ensure_loaded(&host).await, BridgeStatus::Failed);
        assert!(!b.is_ready());
        assert!(!b.is_loading());
        assert_eq!(b.ensure_loaded(&host).await, BridgeStatus::Failed);
        assert_eq!(host.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_html_head_second_bridge_reuses_tag() {
        let head = HtmlHead::new();
        let mut first = bridge();
        let mut second = bridge();
        first.ensure_loaded(&head).await;
        second.ensure_loaded(&head).await;
        assert!(second.is_ready());
        assert_eq!(head.render().matches("<script").count(), 1);
        assert!(head.render().contains(r#"data-client-key="SB-key""#));
    }
}
