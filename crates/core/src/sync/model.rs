//! Sync domain models shared by the storage and engine crates.

use serde::{Deserialize, Serialize};

/// Canonical list of local tables mirrored from the remote backend.
pub const MIRRORED_TABLES: [&str; 3] = ["fasts", "fast_blocks", "fast_days"];

/// Mirrored tables addressable by queue entries and remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTable {
    Fasts,
    FastBlocks,
    FastDays,
}

impl SyncTable {
    /// Remote/local table name for this entity.
    pub fn table_name(&self) -> &'static str {
        match self {
            SyncTable::Fasts => "fasts",
            SyncTable::FastBlocks => "fast_blocks",
            SyncTable::FastDays => "fast_days",
        }
    }
}

/// Supported mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Insert,
    Update,
    Delete,
}

/// Queue entry lifecycle status.
///
/// There is no "in flight" state: an entry is pending until its replay
/// succeeds (row deleted) or is given up on (dead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEntryStatus {
    Pending,
    Dead,
}

/// A pending mutation awaiting replay against the remote backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: i64,
    pub table: SyncTable,
    pub op: SyncOperation,
    pub record_id: String,
    /// JSON snapshot of the record to apply (sync-metadata fields stripped).
    pub payload: String,
    pub created_at: String,
    pub attempts: i32,
    pub status: QueueEntryStatus,
    pub next_retry_at: Option<String>,
    pub last_error: Option<String>,
    pub last_error_code: Option<String>,
}

/// Persisted engine-level sync status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEngineStatus {
    pub last_push_at: Option<String>,
    pub last_pull_at: Option<String>,
    /// Set only when a full cycle (push + pull) completed.
    pub last_synced_at: Option<String>,
    pub last_error: Option<String>,
    pub consecutive_failures: i32,
    pub next_retry_at: Option<String>,
    pub last_cycle_status: Option<String>,
    pub last_cycle_duration_ms: Option<i64>,
}

/// What asked for a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncCycleTrigger {
    Startup,
    Reconnect,
    Periodic,
    Manual,
    Background,
}

/// Terminal status of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Push and pull both completed.
    Ok,
    /// Skipped: the device is offline.
    Offline,
    /// Skipped: no signed-in user.
    NoSession,
    /// Another cycle is in flight; a follow-up run was requested.
    Coalesced,
    /// Push aborted: the backend wants fresh credentials.
    AuthError,
    /// Pull failed; queued entries and prior bulk writes are untouched.
    PullError,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Ok => "ok",
            CycleStatus::Offline => "offline",
            CycleStatus::NoSession => "no_session",
            CycleStatus::Coalesced => "coalesced",
            CycleStatus::AuthError => "auth_error",
            CycleStatus::PullError => "pull_error",
        }
    }
}

/// Outcome metrics for one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCycleResult {
    pub status: CycleStatus,
    pub trigger: SyncCycleTrigger,
    pub pushed_count: usize,
    pub pulled_count: usize,
    pub failed_count: usize,
    pub duration_ms: i64,
}

impl SyncCycleResult {
    pub fn skipped(status: CycleStatus, trigger: SyncCycleTrigger) -> Self {
        Self {
            status,
            trigger,
            pushed_count: 0,
            pulled_count: 0,
            failed_count: 0,
            duration_ms: 0,
        }
    }
}

/// Change notification published after committed local writes.
///
/// Subscribers re-read live state from the store; events carry no row data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "table")]
pub enum StoreEvent {
    /// Rows in a mirrored table changed (local mutation or pull).
    TableChanged(SyncTable),
    /// The mutation queue grew or shrank.
    QueueChanged,
    /// A full sync cycle completed successfully.
    SyncCompleted,
}
