//! Mutation-queue persistence.
//!
//! Entries are appended by the entity repositories inside the same writer
//! transaction as the entity row, drained by the sync engine in creation
//! order, and removed only after a successful remote replay.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use vigil_core::errors::{DatabaseError, Error, Result};
use vigil_core::sync::{
    QueueEntry, QueueEntryStatus, SyncOperation, SyncTable, MAX_REPLAY_ATTEMPTS,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_queue;

use super::model::{NewSyncQueueEntryDB, SyncQueueEntryDB};

pub(crate) fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

pub(crate) fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

/// Remove the local-only sync-metadata fields from a queue payload.
/// The remote schema has no such columns and would reject the write.
fn strip_sync_metadata(payload: &mut serde_json::Value) {
    if let Some(object) = payload.as_object_mut() {
        object.remove("pending_sync");
        object.remove("last_synced");
    }
}

/// Append a queue entry on an open writer transaction. Callers pass the
/// full record snapshot; sync-metadata fields are stripped here.
pub fn append_queue_entry(
    conn: &mut SqliteConnection,
    table: SyncTable,
    op: SyncOperation,
    record_id: &str,
    payload: &serde_json::Value,
) -> Result<i64> {
    let mut payload = payload.clone();
    strip_sync_metadata(&mut payload);

    let row = NewSyncQueueEntryDB {
        table_name: enum_to_db(&table)?,
        op: enum_to_db(&op)?,
        record_id: record_id.to_string(),
        payload: serde_json::to_string(&payload)?,
        created_at: Utc::now().to_rfc3339(),
        attempts: 0,
        status: enum_to_db(&QueueEntryStatus::Pending)?,
    };

    let entry_id = diesel::insert_into(sync_queue::table)
        .values(&row)
        .returning(sync_queue::id)
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?;

    Ok(entry_id)
}

fn to_queue_entry(row: SyncQueueEntryDB) -> Result<QueueEntry> {
    Ok(QueueEntry {
        id: row.id,
        table: enum_from_db(&row.table_name)?,
        op: enum_from_db(&row.op)?,
        record_id: row.record_id,
        payload: row.payload,
        created_at: row.created_at,
        attempts: row.attempts,
        status: enum_from_db(&row.status)?,
        next_retry_at: row.next_retry_at,
        last_error: row.last_error,
        last_error_code: row.last_error_code,
    })
}

pub struct SyncQueueRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncQueueRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Pending entries whose retry time has come, oldest first. Read
    /// without removing; the engine removes per entry after replay.
    pub fn list_due(&self, limit: i64) -> Result<Vec<QueueEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let now = Utc::now().to_rfc3339();

        let rows = sync_queue::table
            .filter(sync_queue::status.eq(enum_to_db(&QueueEntryStatus::Pending)?))
            .filter(
                sync_queue::next_retry_at
                    .is_null()
                    .or(sync_queue::next_retry_at.le(now)),
            )
            .order((sync_queue::created_at.asc(), sync_queue::id.asc()))
            .limit(limit)
            .load::<SyncQueueEntryDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(to_queue_entry).collect()
    }

    /// Every pending entry regardless of retry schedule, oldest first.
    pub fn list_pending(&self) -> Result<Vec<QueueEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sync_queue::table
            .filter(sync_queue::status.eq(enum_to_db(&QueueEntryStatus::Pending)?))
            .order((sync_queue::created_at.asc(), sync_queue::id.asc()))
            .load::<SyncQueueEntryDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(to_queue_entry).collect()
    }

    /// Dead-lettered entries for manual resolution.
    pub fn list_dead(&self) -> Result<Vec<QueueEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sync_queue::table
            .filter(sync_queue::status.eq(enum_to_db(&QueueEntryStatus::Dead)?))
            .order((sync_queue::created_at.asc(), sync_queue::id.asc()))
            .load::<SyncQueueEntryDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(to_queue_entry).collect()
    }

    pub fn pending_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = sync_queue::table
            .filter(sync_queue::status.eq(enum_to_db(&QueueEntryStatus::Pending)?))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    /// True when another pending entry still references the record.
    pub fn has_pending_for_record(&self, table: SyncTable, record_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let count = sync_queue::table
            .filter(sync_queue::status.eq(enum_to_db(&QueueEntryStatus::Pending)?))
            .filter(sync_queue::table_name.eq(enum_to_db(&table)?))
            .filter(sync_queue::record_id.eq(record_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    /// Delete an entry after its remote replay succeeded.
    pub async fn remove(&self, entry_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(sync_queue::table.find(entry_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    /// Record a failed replay: bump `attempts`, schedule the next try, and
    /// dead-letter once the attempt ceiling is reached.
    pub async fn mark_failed(
        &self,
        entry_id: i64,
        backoff_seconds: i64,
        last_error: Option<String>,
        last_error_code: Option<String>,
    ) -> Result<QueueEntryStatus> {
        self.writer
            .exec(move |conn| {
                let row = sync_queue::table
                    .find(entry_id)
                    .first::<SyncQueueEntryDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| {
                        Error::Database(DatabaseError::Internal(format!(
                            "Queue entry {} vanished during retry scheduling",
                            entry_id
                        )))
                    })?;

                let attempts = row.attempts + 1;
                let status = if attempts >= MAX_REPLAY_ATTEMPTS {
                    QueueEntryStatus::Dead
                } else {
                    QueueEntryStatus::Pending
                };
                let retry_at = match status {
                    QueueEntryStatus::Pending => {
                        Some((Utc::now() + Duration::seconds(backoff_seconds)).to_rfc3339())
                    }
                    QueueEntryStatus::Dead => None,
                };

                diesel::update(sync_queue::table.find(entry_id))
                    .set((
                        sync_queue::attempts.eq(attempts),
                        sync_queue::status.eq(enum_to_db(&status)?),
                        sync_queue::next_retry_at.eq(retry_at),
                        sync_queue::last_error.eq(last_error.clone()),
                        sync_queue::last_error_code.eq(last_error_code.clone()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(status)
            })
            .await
    }

    /// Dead-letter an entry immediately (permanent remote rejection).
    pub async fn mark_dead(
        &self,
        entry_id: i64,
        last_error: Option<String>,
        last_error_code: Option<String>,
    ) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(sync_queue::table.find(entry_id))
                    .set((
                        sync_queue::status.eq(enum_to_db(&QueueEntryStatus::Dead)?),
                        sync_queue::next_retry_at.eq::<Option<String>>(None),
                        sync_queue::last_error.eq(last_error.clone()),
                        sync_queue::last_error_code.eq(last_error_code.clone()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
