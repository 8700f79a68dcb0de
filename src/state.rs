use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::http::{header, HeaderMap};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use uuid::Uuid;

use crate::api::{ApiClient, Transport};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::flows::continuation::ContinuationFlow;

/// How long an expired page keeps its flow, so a late widget outcome still resolves.
pub const EXPIRED_MOUNT_GRACE: Duration = Duration::from_secs(5 * 60);
/// Live payment pages kept at once; the one closest to its deadline goes first.
pub const MAX_MOUNTS: usize = 10_000;

type FlowMap = HashMap<Uuid, ContinuationFlow>;

pub struct AppState {
    pub config: AppConfig,
    pub api: ApiClient,
    /// One continuation flow per mounted payment page.
    pub continuations: Mutex<FlowMap>,
    /// The countdown task feeding each mount's open stream.
    countdown_timers: Mutex<HashMap<Uuid, AbortHandle>>,
}

impl AppState {
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            api: ApiClient::new(transport),
            continuations: Mutex::new(HashMap::new()),
            countdown_timers: Mutex::new(HashMap::new()),
        }
    }

    /// Backend client acting with the browser's cookies.
    pub fn api_for(&self, headers: &HeaderMap) -> ApiClient {
        self.api.with_credentials(cookie_header(headers).map(str::to_string))
    }

    pub fn flows(&self) -> Result<MutexGuard<'_, FlowMap>, AppError> {
        self.continuations
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Register a new page, dropping stale ones first.
    pub fn mount_flow(&self, flow: ContinuationFlow) -> Result<Uuid, AppError> {
        let mut flows = self.flows()?;
        self.evict_locked(&mut flows, Instant::now());

        if flows.len() >= MAX_MOUNTS {
            let oldest = flows
                .iter()
                .min_by_key(|(_, f)| f.countdown().deadline())
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                tracing::warn!(mount_id = %id, "payment page registry full, dropping oldest");
                flows.remove(&id);
                self.stop_countdown(id);
            }
        }

        let id = Uuid::new_v4();
        flows.insert(id, flow);
        Ok(id)
    }

    pub fn unmount(&self, id: Uuid) -> Result<Option<ContinuationFlow>, AppError> {
        let flow = self.flows()?.remove(&id);
        self.stop_countdown(id);
        Ok(flow)
    }

    /// Drop every page whose window closed more than the grace period ago.
    pub fn evict_stale(&self, now: Instant) -> usize {
        match self.continuations.lock() {
            Ok(mut flows) => self.evict_locked(&mut flows, now),
            Err(_) => 0,
        }
    }

    fn evict_locked(&self, flows: &mut FlowMap, now: Instant) -> usize {
        let stale: Vec<Uuid> = flows
            .iter()
            .filter(|(_, f)| f.is_stale(now, EXPIRED_MOUNT_GRACE))
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            flows.remove(id);
            self.stop_countdown(*id);
        }
        if !stale.is_empty() {
            tracing::debug!(evicted = stale.len(), "dropped expired payment pages");
        }
        stale.len()
    }

    /// Make `timer` the only countdown task for `id`.
    pub fn watch_countdown(&self, id: Uuid, timer: AbortHandle) {
        let previous = match self.countdown_timers.lock() {
            Ok(mut timers) => timers.insert(id, timer),
            Err(_) => Some(timer),
        };
        if let Some(old) = previous {
            old.abort();
        }
    }

    fn stop_countdown(&self, id: Uuid) {
        if let Ok(mut timers) = self.countdown_timers.lock() {
            if let Some(timer) = timers.remove(&id) {
                timer.abort();
            }
        }
    }
}

/// Periodically evict stale payment pages for the lifetime of the server.
pub fn spawn_sweeper(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.evict_stale(Instant::now());
        }
    })
}

pub fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}
