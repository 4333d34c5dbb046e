//! Sync cycle engine: push queued mutations, then pull canonical rows.

use chrono::Utc;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use vigil_core::errors::Result;
use vigil_core::fasts::{Fast, FastBlock, FastDay};
use vigil_core::sync::{
    backoff_seconds, CycleStatus, QueueEntry, StoreEvent, SyncCycleResult, SyncCycleTrigger,
    SyncEngineStatus, SyncOperation, SyncRetryClass, SyncTable, PULL_RETRY_DELAY_SECS,
    REAUTH_RETRY_DELAY_SECS,
};
use vigil_remote::{RemoteBackend, RemoteError, RemoteFilter, RemoteResult};
use vigil_storage_sqlite::{
    ChangeNotifier, FastBlockRepository, FastDayRepository, FastRepository, SyncQueueRepository,
    SyncStateRepository,
};

/// Queue entries drained per cycle.
const PUSH_BATCH_LIMIT: i64 = 500;

/// Why the pull phase stopped early.
enum PullAbort {
    Remote(RemoteError),
    Store(vigil_core::Error),
}

fn decode_rows<T: serde::de::DeserializeOwned>(
    rows: Vec<serde_json::Value>,
) -> RemoteResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(RemoteError::from))
        .collect()
}

/// Reconciles local and remote state. One instance per open database;
/// cycles are single-flight with coalescing (a request during a running
/// cycle schedules exactly one follow-up run).
pub struct SyncEngine {
    remote: Arc<dyn RemoteBackend>,
    fasts: Arc<FastRepository>,
    blocks: Arc<FastBlockRepository>,
    days: Arc<FastDayRepository>,
    queue: Arc<SyncQueueRepository>,
    state: Arc<SyncStateRepository>,
    notifier: ChangeNotifier,
    online: AtomicBool,
    syncing: AtomicBool,
    rerun_requested: AtomicBool,
}

impl SyncEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        remote: Arc<dyn RemoteBackend>,
        fasts: Arc<FastRepository>,
        blocks: Arc<FastBlockRepository>,
        days: Arc<FastDayRepository>,
        queue: Arc<SyncQueueRepository>,
        state: Arc<SyncStateRepository>,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            remote,
            fasts,
            blocks,
            days,
            queue,
            state,
            notifier,
            online: AtomicBool::new(false),
            syncing: AtomicBool::new(false),
            rerun_requested: AtomicBool::new(false),
        }
    }

    /// Update connectivity; returns the previous value.
    pub fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst)
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> Result<i64> {
        self.queue.pending_count()
    }

    /// True when at least one queue entry is due for replay right now.
    pub fn has_due_work(&self) -> Result<bool> {
        Ok(!self.queue.list_due(1)?.is_empty())
    }

    pub fn engine_status(&self) -> Result<SyncEngineStatus> {
        self.state.get_status()
    }

    /// Subscribe to store change events (local mutations and pulls).
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent> {
        self.notifier.subscribe()
    }

    /// Run one reconciliation, or coalesce into the cycle already running.
    pub async fn sync(&self, trigger: SyncCycleTrigger) -> Result<SyncCycleResult> {
        if !self.is_online() {
            debug!("[Sync] Offline; skipping {:?} cycle", trigger);
            return Ok(SyncCycleResult::skipped(CycleStatus::Offline, trigger));
        }
        if self.syncing.swap(true, Ordering::SeqCst) {
            self.rerun_requested.store(true, Ordering::SeqCst);
            debug!("[Sync] Cycle in flight; coalescing {:?} request", trigger);
            return Ok(SyncCycleResult::skipped(CycleStatus::Coalesced, trigger));
        }

        let mut outcome = self.run_cycle(trigger).await;
        while outcome.is_ok() && self.rerun_requested.swap(false, Ordering::SeqCst) {
            debug!("[Sync] Running coalesced follow-up cycle");
            outcome = self.run_cycle(trigger).await;
        }
        self.rerun_requested.store(false, Ordering::SeqCst);
        self.syncing.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_cycle(&self, trigger: SyncCycleTrigger) -> Result<SyncCycleResult> {
        let started = Instant::now();
        if !self.is_online() {
            return Ok(SyncCycleResult::skipped(CycleStatus::Offline, trigger));
        }

        let user_id = match self.remote.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("[Sync] No session; nothing to sync");
                return self
                    .finish(CycleStatus::NoSession, trigger, 0, 0, 0, started, None)
                    .await;
            }
            Err(err) => {
                warn!("[Sync] Session lookup failed: {}", err);
                self.state
                    .mark_engine_error(format!("Session lookup failed: {}", err))
                    .await?;
                return self
                    .finish(
                        CycleStatus::AuthError,
                        trigger,
                        0,
                        0,
                        0,
                        started,
                        Some(REAUTH_RETRY_DELAY_SECS),
                    )
                    .await;
            }
        };

        // Push phase: drain due entries in creation order. Failures are
        // per-entry; only a reauth demand aborts the cycle.
        let entries = self.queue.list_due(PUSH_BATCH_LIMIT)?;
        let mut pushed = 0usize;
        let mut failed = 0usize;
        for entry in entries {
            match self.replay_entry(&entry).await {
                Ok(()) => {
                    self.queue.remove(entry.id).await?;
                    if !self
                        .queue
                        .has_pending_for_record(entry.table, &entry.record_id)?
                    {
                        self.mark_record_synced(entry.table, entry.record_id.clone())
                            .await?;
                    }
                    pushed += 1;
                }
                Err(err) => {
                    failed += 1;
                    warn!(
                        "[Sync] Replay failed for entry {} ({} {:?} {}): {}",
                        entry.id,
                        entry.table.table_name(),
                        entry.op,
                        entry.record_id,
                        err
                    );
                    match err.retry_class() {
                        SyncRetryClass::Retryable => {
                            self.queue
                                .mark_failed(
                                    entry.id,
                                    backoff_seconds(entry.attempts),
                                    Some(err.to_string()),
                                    Some(err.error_code().to_string()),
                                )
                                .await?;
                        }
                        SyncRetryClass::Permanent => {
                            self.queue
                                .mark_dead(
                                    entry.id,
                                    Some(err.to_string()),
                                    Some(err.error_code().to_string()),
                                )
                                .await?;
                        }
                        SyncRetryClass::ReauthRequired => {
                            self.queue
                                .mark_failed(
                                    entry.id,
                                    REAUTH_RETRY_DELAY_SECS,
                                    Some(err.to_string()),
                                    Some(err.error_code().to_string()),
                                )
                                .await?;
                            self.state
                                .mark_engine_error("Authentication required".to_string())
                                .await?;
                            self.notifier.publish(StoreEvent::QueueChanged);
                            return self
                                .finish(
                                    CycleStatus::AuthError,
                                    trigger,
                                    pushed,
                                    0,
                                    failed,
                                    started,
                                    Some(REAUTH_RETRY_DELAY_SECS),
                                )
                                .await;
                        }
                    }
                }
            }
        }
        if pushed > 0 {
            self.state.mark_push_completed().await?;
        }
        if pushed > 0 || failed > 0 {
            self.notifier.publish(StoreEvent::QueueChanged);
        }

        // Pull phase: remote is the source of truth for pulled rows.
        match self.pull(&user_id).await {
            Ok(pulled) => {
                self.state.mark_pull_completed().await?;
                self.notifier.publish(StoreEvent::SyncCompleted);
                self.finish(CycleStatus::Ok, trigger, pushed, pulled, failed, started, None)
                    .await
            }
            Err(PullAbort::Remote(err)) => {
                warn!("[Sync] Pull failed: {}", err);
                self.state
                    .mark_engine_error(format!("Pull failed: {}", err))
                    .await?;
                self.finish(
                    CycleStatus::PullError,
                    trigger,
                    pushed,
                    0,
                    failed,
                    started,
                    Some(PULL_RETRY_DELAY_SECS),
                )
                .await
            }
            Err(PullAbort::Store(err)) => Err(err),
        }
    }

    async fn replay_entry(&self, entry: &QueueEntry) -> RemoteResult<()> {
        let payload: serde_json::Value = serde_json::from_str(&entry.payload)?;
        match entry.op {
            SyncOperation::Insert => self.remote.insert(entry.table, payload).await,
            SyncOperation::Update => {
                self.remote
                    .update(entry.table, &entry.record_id, payload)
                    .await
            }
            SyncOperation::Delete => self.remote.delete(entry.table, &entry.record_id).await,
        }
    }

    /// Clear the pending flag once no queue entry references the record.
    /// A deleted record has no local row left; the update is then a no-op.
    async fn mark_record_synced(&self, table: SyncTable, record_id: String) -> Result<()> {
        let synced_at = Utc::now().to_rfc3339();
        match table {
            SyncTable::Fasts => self.fasts.mark_record_synced(record_id, synced_at).await,
            SyncTable::FastBlocks => self.blocks.mark_record_synced(record_id, synced_at).await,
            SyncTable::FastDays => self.days.mark_record_synced(record_id, synced_at).await,
        }
    }

    /// Fetch the user's fasts, then children of the fetched fasts, and
    /// bulk-overwrite the local mirror.
    async fn pull(&self, user_id: &str) -> std::result::Result<usize, PullAbort> {
        let synced_at = Utc::now().to_rfc3339();

        let rows = self
            .remote
            .select_where(SyncTable::Fasts, &[RemoteFilter::eq("user_id", user_id)])
            .await
            .map_err(PullAbort::Remote)?;
        let fasts = decode_rows::<Fast>(rows).map_err(PullAbort::Remote)?;
        let fast_ids: Vec<String> = fasts.iter().map(|fast| fast.id.clone()).collect();

        let mut pulled = self
            .fasts
            .replace_from_remote(fasts, synced_at.clone())
            .await
            .map_err(PullAbort::Store)?;

        if !fast_ids.is_empty() {
            let rows = self
                .remote
                .select_where(
                    SyncTable::FastBlocks,
                    &[RemoteFilter::any_of("fast_id", fast_ids.clone())],
                )
                .await
                .map_err(PullAbort::Remote)?;
            let blocks = decode_rows::<FastBlock>(rows).map_err(PullAbort::Remote)?;
            pulled += self
                .blocks
                .replace_from_remote(blocks, synced_at.clone())
                .await
                .map_err(PullAbort::Store)?;

            let rows = self
                .remote
                .select_where(
                    SyncTable::FastDays,
                    &[RemoteFilter::any_of("fast_id", fast_ids)],
                )
                .await
                .map_err(PullAbort::Remote)?;
            let days = decode_rows::<FastDay>(rows).map_err(PullAbort::Remote)?;
            pulled += self
                .days
                .replace_from_remote(days, synced_at)
                .await
                .map_err(PullAbort::Store)?;
        }

        debug!("[Sync] Pull applied {} rows", pulled);
        Ok(pulled)
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        status: CycleStatus,
        trigger: SyncCycleTrigger,
        pushed_count: usize,
        pulled_count: usize,
        failed_count: usize,
        started: Instant,
        retry_secs: Option<i64>,
    ) -> Result<SyncCycleResult> {
        let duration_ms = started.elapsed().as_millis() as i64;
        let retry_at =
            retry_secs.map(|secs| (Utc::now() + chrono::Duration::seconds(secs)).to_rfc3339());
        self.state
            .mark_cycle_outcome(status.as_str().to_string(), duration_ms, retry_at)
            .await?;
        debug!(
            "[Sync] Cycle complete status={} trigger={:?} pushed={} pulled={} failed={}",
            status.as_str(),
            trigger,
            pushed_count,
            pulled_count,
            failed_count
        );
        Ok(SyncCycleResult {
            status,
            trigger,
            pushed_count,
            pulled_count,
            failed_count,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, new_fast, Call, MockRemote};
    use vigil_core::fasts::{
        FastDayRepositoryTrait, FastPatch, FastRepositoryTrait, NewFastDay,
    };
    use vigil_core::sync::QueueEntryStatus;

    #[tokio::test]
    async fn offline_create_then_sync_pushes_and_stamps() {
        let fx = fixture(MockRemote::with_user("u1"));

        // offline: the mutation lands locally and in the queue only
        let fast = fx
            .fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create");
        let offline = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("offline sync");
        assert_eq!(offline.status, CycleStatus::Offline);
        assert!(fx.remote.calls().is_empty());
        assert_eq!(fx.engine.pending_count().expect("count"), 1);

        // online: one insert replays, the queue drains, the row is stamped
        fx.engine.set_online(true);
        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::Ok);
        assert_eq!(result.pushed_count, 1);

        let inserts: Vec<Call> = fx
            .remote
            .calls()
            .into_iter()
            .filter(|call| call.op == "insert")
            .collect();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].record_id, fast.id);

        assert_eq!(fx.engine.pending_count().expect("count"), 0);
        let stored = fx.fasts.get(&fast.id).expect("get").expect("row");
        assert!(!stored.pending_sync);
        assert!(stored.last_synced.is_some());
        let status = fx.engine.engine_status().expect("status");
        assert!(status.last_synced_at.is_some());
    }

    #[tokio::test]
    async fn push_failures_are_independent_and_retain_entries() {
        let fx = fixture(MockRemote::with_user("u1"));
        fx.engine.set_online(true);

        let first = fx
            .fasts
            .create(new_fast("Lent"), "u1".to_string())
            .await
            .expect("create first");
        let second = fx
            .fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create second");
        fx.remote.fail_record(&first.id, 500);

        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::Ok);
        assert_eq!(result.pushed_count, 1);
        assert_eq!(result.failed_count, 1);

        // the failing entry stays queued with attempts bumped once
        let pending = fx.queue.list_pending().expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].record_id, first.id);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].status, QueueEntryStatus::Pending);

        // the later entry was still attempted and succeeded
        let inserts: Vec<Call> = fx
            .remote
            .calls()
            .into_iter()
            .filter(|call| call.op == "insert")
            .collect();
        assert_eq!(inserts.len(), 2);
        assert!(inserts.iter().any(|call| call.record_id == second.id));
    }

    #[tokio::test]
    async fn permanent_rejection_dead_letters_the_entry() {
        let fx = fixture(MockRemote::with_user("u1"));
        fx.engine.set_online(true);

        let fast = fx
            .fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create");
        fx.remote.fail_record(&fast.id, 400);

        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::Ok);
        assert_eq!(result.failed_count, 1);

        assert_eq!(fx.engine.pending_count().expect("count"), 0);
        let dead = fx.queue.list_dead().expect("dead");
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].record_id, fast.id);
        assert_eq!(dead[0].last_error_code.as_deref(), Some("permanent"));
    }

    #[tokio::test]
    async fn reauth_demand_aborts_the_cycle() {
        let fx = fixture(MockRemote::with_user("u1"));
        fx.engine.set_online(true);

        let first = fx
            .fasts
            .create(new_fast("Lent"), "u1".to_string())
            .await
            .expect("create first");
        fx.fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create second");
        fx.remote.fail_record(&first.id, 401);

        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::AuthError);

        // only the first entry was attempted; the second is untouched
        let inserts: Vec<Call> = fx
            .remote
            .calls()
            .into_iter()
            .filter(|call| call.op == "insert")
            .collect();
        assert_eq!(inserts.len(), 1);
        let pending = fx.queue.list_pending().expect("pending");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].attempts, 0);
    }

    #[tokio::test]
    async fn no_session_is_a_benign_no_op() {
        let fx = fixture(MockRemote::default());
        fx.engine.set_online(true);

        fx.fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create");
        let result = fx
            .engine
            .sync(SyncCycleTrigger::Startup)
            .await
            .expect("sync");

        assert_eq!(result.status, CycleStatus::NoSession);
        assert!(fx.remote.calls().is_empty());
        assert_eq!(fx.engine.pending_count().expect("count"), 1);
    }

    #[tokio::test]
    async fn pull_is_idempotent() {
        let remote = MockRemote::with_user("u1");
        remote.seed_row(
            SyncTable::Fasts,
            serde_json::json!({
                "id": "f1", "user_id": "u1", "name": "Daniel Fast",
                "total_days": 21, "start_date": "2024-03-01",
                "days_completed_before_app": 0, "is_active": true,
                "created_at": "2024-03-01T08:00:00+00:00",
                "updated_at": "2024-03-01T08:00:00+00:00",
            }),
        );
        remote.seed_row(
            SyncTable::FastBlocks,
            serde_json::json!({
                "id": "b1", "fast_id": "f1", "name": "Week 1", "total_days": 7,
                "order_index": 0, "manually_completed": false,
                "created_at": "2024-03-01T08:00:00+00:00",
            }),
        );
        remote.seed_row(
            SyncTable::FastDays,
            serde_json::json!({
                "id": "d1", "fast_id": "f1", "block_id": "b1",
                "date": "2024-03-01", "completed": true,
                "created_at": "2024-03-01T08:00:00+00:00",
            }),
        );

        let fx = fixture(remote);
        fx.engine.set_online(true);

        let first = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("first sync");
        assert_eq!(first.status, CycleStatus::Ok);
        assert_eq!(first.pulled_count, 3);
        let snapshot = (
            fx.fasts.list_for_user("u1").expect("fasts"),
            fx.days.list_for_fast("f1").expect("days"),
        );

        let second = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("second sync");
        assert_eq!(second.pulled_count, 3);
        let resynced_fasts = fx.fasts.list_for_user("u1").expect("fasts");
        let resynced_days = fx.days.list_for_fast("f1").expect("days");
        assert_eq!(snapshot.0.len(), resynced_fasts.len());
        assert_eq!(snapshot.1.len(), resynced_days.len());
        // byte-for-byte identical apart from the refreshed last_synced stamp
        for (before, after) in snapshot.0.iter().zip(resynced_fasts.iter()) {
            let mut before = before.clone();
            let mut after = after.clone();
            before.last_synced = None;
            after.last_synced = None;
            assert_eq!(before, after);
        }
    }

    #[tokio::test]
    async fn failed_pushes_are_rescheduled_with_backoff() {
        let fx = fixture(MockRemote::with_user("u1"));
        fx.engine.set_online(true);

        let fast = fx
            .fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create");
        fx.fasts
            .update(
                fast.id.clone(),
                FastPatch {
                    name: Some("Daniel Fast 2024".to_string()),
                    ..FastPatch::default()
                },
            )
            .await
            .expect("update");
        fx.remote.fail_record(&fast.id, 503);

        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::Ok);
        assert_eq!(result.failed_count, 2);
        assert_eq!(fx.engine.pending_count().expect("count"), 2);

        // both entries are rescheduled into the future and no longer due
        assert!(fx.queue.list_due(10).expect("due").is_empty());
        let row = fx.fasts.get(&fast.id).expect("get").expect("row");
        assert!(row.pending_sync);
    }

    #[tokio::test]
    async fn pull_failure_aborts_the_cycle_without_a_sync_stamp() {
        let fx = fixture(MockRemote::with_user("u1"));
        fx.engine.set_online(true);

        let fast = fx
            .fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create");
        fx.remote.fail_selects(502);

        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::PullError);
        // the push still drained the queue before the pull failed
        assert_eq!(result.pushed_count, 1);
        assert_eq!(fx.engine.pending_count().expect("count"), 0);
        assert_eq!(
            fx.remote
                .calls()
                .iter()
                .filter(|call| call.record_id == fast.id)
                .count(),
            1
        );

        let status = fx.engine.engine_status().expect("status");
        assert!(status.last_synced_at.is_none());
        assert!(status.last_error.as_deref().unwrap_or("").contains("Pull failed"));
        assert!(status.next_retry_at.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_request_coalesces_into_follow_up_cycle() {
        let remote = MockRemote::with_user("u1");
        let (release, gate) = tokio::sync::oneshot::channel();
        *remote.pull_gate.lock().unwrap() = Some(gate);

        let fx = fixture(remote);
        fx.engine.set_online(true);

        let engine = fx.engine.clone();
        let blocked = tokio::spawn(async move { engine.sync(SyncCycleTrigger::Periodic).await });

        // wait until the first cycle is parked inside the pull
        while fx.remote.pull_count(SyncTable::Fasts) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(fx.engine.is_syncing());

        let coalesced = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("coalesced sync");
        assert_eq!(coalesced.status, CycleStatus::Coalesced);

        release.send(()).expect("release pull");
        let first = blocked.await.expect("join").expect("first sync");
        assert_eq!(first.status, CycleStatus::Ok);
        assert!(!fx.engine.is_syncing());

        // the follow-up cycle ran: two pulls of the fasts table
        assert_eq!(fx.remote.pull_count(SyncTable::Fasts), 2);
    }

    #[tokio::test]
    async fn day_logging_round_trips_through_the_queue() {
        let fx = fixture(MockRemote::with_user("u1"));
        fx.engine.set_online(true);

        let fast = fx
            .fasts
            .create(new_fast("Daniel Fast"), "u1".to_string())
            .await
            .expect("create fast");
        let day = fx
            .days
            .create(NewFastDay {
                fast_id: fast.id.clone(),
                block_id: None,
                date: "2024-03-01".to_string(),
                completed: true,
            })
            .await
            .expect("create day");

        let result = fx
            .engine
            .sync(SyncCycleTrigger::Manual)
            .await
            .expect("sync");
        assert_eq!(result.status, CycleStatus::Ok);
        assert_eq!(result.pushed_count, 2);

        let stored = fx.days.get(&day.id).expect("get").expect("row");
        assert!(!stored.pending_sync);
        assert_eq!(stored.date, "2024-03-01");
    }
}
