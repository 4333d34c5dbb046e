//! Persisted engine-level sync status (singleton row).

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use vigil_core::errors::Result;
use vigil_core::sync::SyncEngineStatus;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_engine_state;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::sync_engine_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncEngineStateDB {
    pub id: i32,
    pub last_push_at: Option<String>,
    pub last_pull_at: Option<String>,
    pub last_synced_at: Option<String>,
    pub last_error: Option<String>,
    pub consecutive_failures: i32,
    pub next_retry_at: Option<String>,
    pub last_cycle_status: Option<String>,
    pub last_cycle_duration_ms: Option<i64>,
}

fn empty_state() -> SyncEngineStateDB {
    SyncEngineStateDB {
        id: 1,
        last_push_at: None,
        last_pull_at: None,
        last_synced_at: None,
        last_error: None,
        consecutive_failures: 0,
        next_retry_at: None,
        last_cycle_status: None,
        last_cycle_duration_ms: None,
    }
}

pub struct SyncStateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncStateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub fn get_status(&self) -> Result<SyncEngineStatus> {
        let mut conn = get_connection(&self.pool)?;
        let state = sync_engine_state::table
            .find(1)
            .first::<SyncEngineStateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(SyncEngineStatus {
            last_push_at: state.as_ref().and_then(|s| s.last_push_at.clone()),
            last_pull_at: state.as_ref().and_then(|s| s.last_pull_at.clone()),
            last_synced_at: state.as_ref().and_then(|s| s.last_synced_at.clone()),
            last_error: state.as_ref().and_then(|s| s.last_error.clone()),
            consecutive_failures: state.as_ref().map(|s| s.consecutive_failures).unwrap_or(0),
            next_retry_at: state.as_ref().and_then(|s| s.next_retry_at.clone()),
            last_cycle_status: state.as_ref().and_then(|s| s.last_cycle_status.clone()),
            last_cycle_duration_ms: state.and_then(|s| s.last_cycle_duration_ms),
        })
    }

    pub async fn mark_push_completed(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let mut row = empty_state();
                row.last_push_at = Some(now.clone());
                diesel::insert_into(sync_engine_state::table)
                    .values(&row)
                    .on_conflict(sync_engine_state::id)
                    .do_update()
                    .set((
                        sync_engine_state::last_push_at.eq(Some(now)),
                        sync_engine_state::last_error.eq::<Option<String>>(None),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    /// Record a completed pull; also bumps the engine-level sync time.
    pub async fn mark_pull_completed(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let mut row = empty_state();
                row.last_pull_at = Some(now.clone());
                row.last_synced_at = Some(now.clone());
                diesel::insert_into(sync_engine_state::table)
                    .values(&row)
                    .on_conflict(sync_engine_state::id)
                    .do_update()
                    .set((
                        sync_engine_state::last_pull_at.eq(Some(now.clone())),
                        sync_engine_state::last_synced_at.eq(Some(now)),
                        sync_engine_state::last_error.eq::<Option<String>>(None),
                        sync_engine_state::consecutive_failures.eq(0),
                        sync_engine_state::next_retry_at.eq::<Option<String>>(None),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    pub async fn mark_engine_error(&self, error_message: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let mut row = empty_state();
                row.last_error = Some(error_message.clone());
                row.consecutive_failures = 1;
                row.last_cycle_status = Some("error".to_string());
                diesel::insert_into(sync_engine_state::table)
                    .values(&row)
                    .on_conflict(sync_engine_state::id)
                    .do_update()
                    .set((
                        sync_engine_state::last_error.eq(Some(error_message)),
                        sync_engine_state::consecutive_failures
                            .eq(sync_engine_state::consecutive_failures + 1),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    pub async fn mark_cycle_outcome(
        &self,
        status_value: String,
        duration_ms_value: i64,
        next_retry_at_value: Option<String>,
    ) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let mut row = empty_state();
                row.last_cycle_status = Some(status_value.clone());
                row.last_cycle_duration_ms = Some(duration_ms_value);
                row.next_retry_at = next_retry_at_value.clone();
                diesel::insert_into(sync_engine_state::table)
                    .values(&row)
                    .on_conflict(sync_engine_state::id)
                    .do_update()
                    .set((
                        sync_engine_state::last_cycle_status.eq(Some(status_value)),
                        sync_engine_state::last_cycle_duration_ms.eq(Some(duration_ms_value)),
                        sync_engine_state::next_retry_at.eq(next_retry_at_value),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
