//! Connectivity & trigger monitor: decides when sync cycles run and
//! exposes observable status to the UI layer.
//!
//! All triggers converge on `SyncEngine::sync`: the offline→online
//! transition, a periodic timer while online, startup, an explicit
//! "sync now", and the platform's background-task signal.

use chrono::Utc;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use vigil_core::errors::Result;
use vigil_core::sync::{
    SyncCycleResult, SyncCycleTrigger, SYNC_INTERVAL_JITTER_SECS, SYNC_PENDING_SHORT_DELAY_MS,
    SYNC_PERIODIC_INTERVAL_SECS,
};

use crate::engine::SyncEngine;

/// Observable sync state for UI display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub is_online: bool,
    pub is_syncing: bool,
    pub pending_count: i64,
    pub last_sync_time: Option<String>,
}

/// Milliseconds until an RFC 3339 instant; `Some(0)` when it has passed.
fn millis_until_rfc3339(value: &str) -> Option<u64> {
    let target = chrono::DateTime::parse_from_rfc3339(value).ok()?;
    let delta = target.with_timezone(&Utc) - Utc::now();
    Some(delta.num_milliseconds().max(0) as u64)
}

pub struct SyncMonitor {
    engine: Arc<SyncEngine>,
    background: Mutex<Option<JoinHandle<()>>>,
}

impl SyncMonitor {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            background: Mutex::new(None),
        }
    }

    /// Mirror a platform connectivity event. An offline→online transition
    /// schedules a reconnect sync.
    pub fn set_online(&self, online: bool) {
        let was_online = self.engine.set_online(online);
        if online && !was_online {
            info!("[Sync] Connectivity restored; scheduling reconnect sync");
            self.spawn_cycle(SyncCycleTrigger::Reconnect);
        }
        if !online && was_online {
            debug!("[Sync] Connectivity lost");
        }
    }

    /// Run a startup sync when online and start the periodic loop.
    pub async fn start(&self) {
        if self.engine.is_online() {
            self.spawn_cycle(SyncCycleTrigger::Startup);
        }

        let mut guard = self.background.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
            guard.take();
        }

        let engine = Arc::clone(&self.engine);
        let handle = tokio::spawn(async move {
            loop {
                let jitter_ms = rand::thread_rng().gen_range(0..=SYNC_INTERVAL_JITTER_SECS * 1000);
                let mut delay_ms = SYNC_PERIODIC_INTERVAL_SECS * 1000 + jitter_ms;

                // An engine-scheduled retry or already-due queue work
                // shortens the wait.
                if let Ok(status) = engine.engine_status() {
                    if let Some(next_retry_at) = status.next_retry_at.as_deref() {
                        if let Some(wait_ms) = millis_until_rfc3339(next_retry_at) {
                            delay_ms = delay_ms.min(wait_ms.saturating_add(jitter_ms).max(1_000));
                        }
                    }
                }
                if engine.has_due_work().unwrap_or(false) {
                    delay_ms = delay_ms.min(SYNC_PENDING_SHORT_DELAY_MS + jitter_ms % 500);
                }

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                if !engine.is_online() {
                    continue;
                }
                if let Err(err) = engine.sync(SyncCycleTrigger::Periodic).await {
                    warn!("[Sync] Periodic cycle failed: {}", err);
                }
            }
        });
        *guard = Some(handle);
    }

    /// Stop scheduling new cycles. An in-flight cycle runs to completion;
    /// only the timer task is aborted.
    pub async fn stop(&self) {
        let mut guard = self.background.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }

    /// Explicit user-initiated sync.
    pub async fn sync_now(&self) -> Result<SyncCycleResult> {
        self.engine.sync(SyncCycleTrigger::Manual).await
    }

    /// Entry point for the platform's background task system.
    pub async fn background_signal(&self) -> Result<SyncCycleResult> {
        self.engine.sync(SyncCycleTrigger::Background).await
    }

    pub fn status(&self) -> Result<SyncStatusSnapshot> {
        Ok(SyncStatusSnapshot {
            is_online: self.engine.is_online(),
            is_syncing: self.engine.is_syncing(),
            pending_count: self.engine.pending_count()?,
            last_sync_time: self.engine.engine_status()?.last_synced_at,
        })
    }

    fn spawn_cycle(&self, trigger: SyncCycleTrigger) {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            if let Err(err) = engine.sync(trigger).await {
                warn!("[Sync] {:?} cycle failed: {}", trigger, err);
            }
        });
    }
}
