//! Database models for the mutation queue.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Identifiable, Selectable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sync_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncQueueEntryDB {
    pub id: i64,
    pub table_name: String,
    pub op: String,
    pub record_id: String,
    pub payload: String,
    pub created_at: String,
    pub attempts: i32,
    pub status: String,
    pub next_retry_at: Option<String>,
    pub last_error: Option<String>,
    pub last_error_code: Option<String>,
}

/// Insert form; `id` is assigned by SQLite, retry fields start at their
/// column defaults.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_queue)]
pub struct NewSyncQueueEntryDB {
    pub table_name: String,
    pub op: String,
    pub record_id: String,
    pub payload: String,
    pub created_at: String,
    pub attempts: i32,
    pub status: String,
}
