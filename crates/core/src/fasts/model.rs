//! Mirrored fasting entities.
//!
//! Field names match the remote Postgres schema; timestamps are RFC 3339
//! strings and calendar days are `YYYY-MM-DD` strings. `pending_sync` and
//! `last_synced` exist only in the local mirror and are stripped from queue
//! payloads before replay.

use serde::{Deserialize, Serialize};

/// A configured fast owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fast {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_days: i32,
    pub start_date: String,
    pub days_completed_before_app: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Local-only: true while changes await replay against the remote.
    #[serde(default)]
    pub pending_sync: bool,
    /// Local-only: time of the last successful push or pull touching this row.
    #[serde(default)]
    pub last_synced: Option<String>,
}

/// Payload for creating a fast; id and timestamps are stamped by the
/// repository so creation works fully offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFast {
    pub name: String,
    pub total_days: i32,
    pub start_date: String,
    #[serde(default)]
    pub days_completed_before_app: i32,
    #[serde(default)]
    pub is_active: bool,
}

/// Partial update for a fast; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastPatch {
    pub name: Option<String>,
    pub total_days: Option<i32>,
    pub start_date: Option<String>,
    pub days_completed_before_app: Option<i32>,
    pub is_active: Option<bool>,
}

/// An ordered segment of a fast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastBlock {
    pub id: String,
    pub fast_id: String,
    pub name: String,
    pub total_days: i32,
    /// Display/processing order within the fast; unique and contiguous
    /// from 0. The repository re-indexes survivors on delete.
    pub order_index: i32,
    pub manually_completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub pending_sync: bool,
    #[serde(default)]
    pub last_synced: Option<String>,
}

/// Payload for creating a block; the repository appends it after the
/// fast's current last block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFastBlock {
    pub fast_id: String,
    pub name: String,
    pub total_days: i32,
}

/// Partial update for a block. `order_index` is repository-managed and
/// deliberately not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastBlockPatch {
    pub name: Option<String>,
    pub total_days: Option<i32>,
    pub manually_completed: Option<bool>,
}

/// One logged calendar day of a fast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastDay {
    pub id: String,
    pub fast_id: String,
    /// A day may be unassigned to any block.
    pub block_id: Option<String>,
    pub date: String,
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub pending_sync: bool,
    #[serde(default)]
    pub last_synced: Option<String>,
}

/// Payload for logging a day. Duplicate prevention per (fast, date) is the
/// calling layer's responsibility; `FastService::log_day` checks first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFastDay {
    pub fast_id: String,
    #[serde(default)]
    pub block_id: Option<String>,
    pub date: String,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update for a day. The outer `Option` means "touch this field";
/// the inner one carries the new, possibly-null block assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastDayPatch {
    pub completed: Option<bool>,
    pub block_id: Option<Option<String>>,
}
