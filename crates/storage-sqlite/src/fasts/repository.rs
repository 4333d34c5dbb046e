//! Entity repositories: the only sanctioned mutation path for mirrored
//! state. Every mutation runs as one writer transaction covering the
//! entity rows and their queue entries, then publishes change events.

use diesel::prelude::*;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use vigil_core::errors::{Error, Result};
use vigil_core::fasts::{
    Fast, FastBlock, FastBlockPatch, FastBlockRepositoryTrait, FastDay, FastDayPatch,
    FastDayRepositoryTrait, FastPatch, FastRepositoryTrait, NewFast, NewFastBlock, NewFastDay,
};
use vigil_core::sync::{StoreEvent, SyncOperation, SyncTable};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::events::ChangeNotifier;
use crate::queue::append_queue_entry;
use crate::schema::{fast_blocks, fast_days, fasts};

use super::model::{FastBlockDB, FastDB, FastDayDB};

/// Update a fast row in place and enqueue the merged snapshot.
fn write_fast_update(conn: &mut SqliteConnection, row: &FastDB) -> Result<()> {
    diesel::update(fasts::table.find(&row.id))
        .set(row)
        .execute(conn)
        .map_err(StorageError::from)?;
    append_queue_entry(
        conn,
        SyncTable::Fasts,
        SyncOperation::Update,
        &row.id,
        &serde_json::to_value(row)?,
    )?;
    Ok(())
}

/// Deactivate every active fast of the user except `except_id`. Each
/// touched row is re-stamped and enqueued as its own update.
fn deactivate_others(conn: &mut SqliteConnection, owner: &str, except_id: &str) -> Result<()> {
    let active_rows = fasts::table
        .filter(fasts::user_id.eq(owner))
        .filter(fasts::is_active.eq(true))
        .filter(fasts::id.ne(except_id))
        .load::<FastDB>(conn)
        .map_err(StorageError::from)?;

    let now = Utc::now().to_rfc3339();
    for mut row in active_rows {
        row.is_active = false;
        row.updated_at = now.clone();
        row.pending_sync = true;
        write_fast_update(conn, &row)?;
    }
    Ok(())
}

pub struct FastRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    notifier: ChangeNotifier,
}

impl FastRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, notifier: ChangeNotifier) -> Self {
        Self {
            pool,
            writer,
            notifier,
        }
    }

    /// Overwrite the mirror with rows pulled from the remote, stamping each
    /// as synced. Upserts only; local rows absent from `rows` are kept.
    pub async fn replace_from_remote(&self, rows: Vec<Fast>, synced_at: String) -> Result<usize> {
        let applied = self
            .writer
            .exec(move |conn| {
                let mut applied = 0usize;
                for fast in rows {
                    let mut row = FastDB::from(fast);
                    row.pending_sync = false;
                    row.last_synced = Some(synced_at.clone());
                    diesel::insert_into(fasts::table)
                        .values(&row)
                        .on_conflict(fasts::id)
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    applied += 1;
                }
                Ok(applied)
            })
            .await?;
        if applied > 0 {
            self.notifier.publish(StoreEvent::TableChanged(SyncTable::Fasts));
        }
        Ok(applied)
    }

    /// Clear the pending flag after the record's queue entries replayed.
    pub async fn mark_record_synced(&self, fast_id: String, synced_at: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(fasts::table.find(fast_id))
                    .set((
                        fasts::pending_sync.eq(false),
                        fasts::last_synced.eq(Some(synced_at)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        self.notifier.publish(StoreEvent::TableChanged(SyncTable::Fasts));
        Ok(())
    }
}

#[async_trait]
impl FastRepositoryTrait for FastRepository {
    fn get(&self, fast_id: &str) -> Result<Option<Fast>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fasts::table
            .find(fast_id)
            .first::<FastDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Fast::from))
    }

    fn list_for_user(&self, owner: &str) -> Result<Vec<Fast>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fasts::table
            .filter(fasts::user_id.eq(owner))
            .order(fasts::created_at.asc())
            .load::<FastDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Fast::from).collect())
    }

    fn active_for_user(&self, owner: &str) -> Result<Option<Fast>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fasts::table
            .filter(fasts::user_id.eq(owner))
            .filter(fasts::is_active.eq(true))
            .first::<FastDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Fast::from))
    }

    async fn create(&self, new_fast: NewFast, owner: String) -> Result<Fast> {
        let fast = self
            .writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let row = FastDB {
                    id: Uuid::new_v4().to_string(),
                    user_id: owner.clone(),
                    name: new_fast.name,
                    total_days: new_fast.total_days,
                    start_date: new_fast.start_date,
                    days_completed_before_app: new_fast.days_completed_before_app,
                    is_active: new_fast.is_active,
                    created_at: now.clone(),
                    updated_at: now,
                    pending_sync: true,
                    last_synced: None,
                };

                if row.is_active {
                    deactivate_others(conn, &owner, &row.id)?;
                }

                diesel::insert_into(fasts::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_queue_entry(
                    conn,
                    SyncTable::Fasts,
                    SyncOperation::Insert,
                    &row.id,
                    &serde_json::to_value(&row)?,
                )?;
                Ok(Fast::from(row))
            })
            .await?;

        self.notifier.publish(StoreEvent::TableChanged(SyncTable::Fasts));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(fast)
    }

    async fn update(&self, fast_id: String, patch: FastPatch) -> Result<Fast> {
        let fast = self
            .writer
            .exec(move |conn| {
                let mut row = fasts::table
                    .find(&fast_id)
                    .first::<FastDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::not_found(format!("fast '{}'", fast_id)))?;

                if let Some(name) = patch.name {
                    row.name = name;
                }
                if let Some(total_days) = patch.total_days {
                    row.total_days = total_days;
                }
                if let Some(start_date) = patch.start_date {
                    row.start_date = start_date;
                }
                if let Some(days) = patch.days_completed_before_app {
                    row.days_completed_before_app = days;
                }
                if let Some(active) = patch.is_active {
                    row.is_active = active;
                }
                row.updated_at = Utc::now().to_rfc3339();
                row.pending_sync = true;

                write_fast_update(conn, &row)?;
                Ok(Fast::from(row))
            })
            .await?;

        self.notifier.publish(StoreEvent::TableChanged(SyncTable::Fasts));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(fast)
    }

    /// Deletes the fast and its children from the local mirror and enqueues
    /// a single delete for the fast. The remote schema declares
    /// `ON DELETE CASCADE` on child foreign keys; child rows are not
    /// enqueued separately.
    async fn delete(&self, fast_id: String) -> Result<usize> {
        let affected = self
            .writer
            .exec(move |conn| {
                diesel::delete(fast_days::table.filter(fast_days::fast_id.eq(&fast_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::delete(fast_blocks::table.filter(fast_blocks::fast_id.eq(&fast_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let affected = diesel::delete(fasts::table.find(&fast_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if affected > 0 {
                    append_queue_entry(
                        conn,
                        SyncTable::Fasts,
                        SyncOperation::Delete,
                        &fast_id,
                        &serde_json::json!({ "id": fast_id }),
                    )?;
                }
                Ok(affected)
            })
            .await?;

        if affected > 0 {
            self.notifier.publish(StoreEvent::TableChanged(SyncTable::Fasts));
            self.notifier
                .publish(StoreEvent::TableChanged(SyncTable::FastBlocks));
            self.notifier
                .publish(StoreEvent::TableChanged(SyncTable::FastDays));
            self.notifier.publish(StoreEvent::QueueChanged);
        }
        Ok(affected)
    }

    async fn set_active(&self, fast_id: String, owner: String) -> Result<Fast> {
        let fast = self
            .writer
            .exec(move |conn| {
                let mut target = fasts::table
                    .find(&fast_id)
                    .first::<FastDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::not_found(format!("fast '{}'", fast_id)))?;
                if target.user_id != owner {
                    return Err(Error::not_found(format!("fast '{}'", fast_id)));
                }

                deactivate_others(conn, &owner, &fast_id)?;

                target.is_active = true;
                target.updated_at = Utc::now().to_rfc3339();
                target.pending_sync = true;
                write_fast_update(conn, &target)?;
                Ok(Fast::from(target))
            })
            .await?;

        self.notifier.publish(StoreEvent::TableChanged(SyncTable::Fasts));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(fast)
    }
}

pub struct FastBlockRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    notifier: ChangeNotifier,
}

impl FastBlockRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, notifier: ChangeNotifier) -> Self {
        Self {
            pool,
            writer,
            notifier,
        }
    }

    pub async fn replace_from_remote(
        &self,
        rows: Vec<FastBlock>,
        synced_at: String,
    ) -> Result<usize> {
        let applied = self
            .writer
            .exec(move |conn| {
                let mut applied = 0usize;
                for block in rows {
                    let mut row = FastBlockDB::from(block);
                    row.pending_sync = false;
                    row.last_synced = Some(synced_at.clone());
                    diesel::insert_into(fast_blocks::table)
                        .values(&row)
                        .on_conflict(fast_blocks::id)
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    applied += 1;
                }
                Ok(applied)
            })
            .await?;
        if applied > 0 {
            self.notifier
                .publish(StoreEvent::TableChanged(SyncTable::FastBlocks));
        }
        Ok(applied)
    }

    pub async fn mark_record_synced(&self, block_id: String, synced_at: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(fast_blocks::table.find(block_id))
                    .set((
                        fast_blocks::pending_sync.eq(false),
                        fast_blocks::last_synced.eq(Some(synced_at)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        self.notifier
            .publish(StoreEvent::TableChanged(SyncTable::FastBlocks));
        Ok(())
    }
}

#[async_trait]
impl FastBlockRepositoryTrait for FastBlockRepository {
    fn get(&self, block_id: &str) -> Result<Option<FastBlock>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fast_blocks::table
            .find(block_id)
            .first::<FastBlockDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(FastBlock::from))
    }

    fn list_for_fast(&self, parent: &str) -> Result<Vec<FastBlock>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fast_blocks::table
            .filter(fast_blocks::fast_id.eq(parent))
            .order(fast_blocks::order_index.asc())
            .load::<FastBlockDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(FastBlock::from).collect())
    }

    async fn create(&self, new_block: NewFastBlock) -> Result<FastBlock> {
        let block = self
            .writer
            .exec(move |conn| {
                let next_index = fast_blocks::table
                    .filter(fast_blocks::fast_id.eq(&new_block.fast_id))
                    .select(diesel::dsl::max(fast_blocks::order_index))
                    .first::<Option<i32>>(conn)
                    .map_err(StorageError::from)?
                    .map_or(0, |max| max + 1);

                let row = FastBlockDB {
                    id: Uuid::new_v4().to_string(),
                    fast_id: new_block.fast_id,
                    name: new_block.name,
                    total_days: new_block.total_days,
                    order_index: next_index,
                    manually_completed: false,
                    created_at: Utc::now().to_rfc3339(),
                    pending_sync: true,
                    last_synced: None,
                };

                diesel::insert_into(fast_blocks::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_queue_entry(
                    conn,
                    SyncTable::FastBlocks,
                    SyncOperation::Insert,
                    &row.id,
                    &serde_json::to_value(&row)?,
                )?;
                Ok(FastBlock::from(row))
            })
            .await?;

        self.notifier
            .publish(StoreEvent::TableChanged(SyncTable::FastBlocks));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(block)
    }

    async fn update(&self, block_id: String, patch: FastBlockPatch) -> Result<FastBlock> {
        let block = self
            .writer
            .exec(move |conn| {
                let mut row = fast_blocks::table
                    .find(&block_id)
                    .first::<FastBlockDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::not_found(format!("block '{}'", block_id)))?;

                if let Some(name) = patch.name {
                    row.name = name;
                }
                if let Some(total_days) = patch.total_days {
                    row.total_days = total_days;
                }
                if let Some(completed) = patch.manually_completed {
                    row.manually_completed = completed;
                }
                row.pending_sync = true;

                diesel::update(fast_blocks::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_queue_entry(
                    conn,
                    SyncTable::FastBlocks,
                    SyncOperation::Update,
                    &row.id,
                    &serde_json::to_value(&row)?,
                )?;
                Ok(FastBlock::from(row))
            })
            .await?;

        self.notifier
            .publish(StoreEvent::TableChanged(SyncTable::FastBlocks));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(block)
    }

    /// Deletes a block, then re-indexes the fast's surviving blocks to
    /// contiguous order from 0. Each shifted block is its own enqueued
    /// update so the remote converges on the same ordering.
    async fn delete(&self, block_id: String) -> Result<usize> {
        let affected = self
            .writer
            .exec(move |conn| {
                let row = fast_blocks::table
                    .find(&block_id)
                    .first::<FastBlockDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let Some(row) = row else {
                    return Ok(0);
                };

                let affected = diesel::delete(fast_blocks::table.find(&block_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_queue_entry(
                    conn,
                    SyncTable::FastBlocks,
                    SyncOperation::Delete,
                    &block_id,
                    &serde_json::json!({ "id": block_id }),
                )?;

                let survivors = fast_blocks::table
                    .filter(fast_blocks::fast_id.eq(&row.fast_id))
                    .order(fast_blocks::order_index.asc())
                    .load::<FastBlockDB>(conn)
                    .map_err(StorageError::from)?;
                for (index, mut survivor) in survivors.into_iter().enumerate() {
                    if survivor.order_index == index as i32 {
                        continue;
                    }
                    survivor.order_index = index as i32;
                    survivor.pending_sync = true;
                    diesel::update(fast_blocks::table.find(&survivor.id))
                        .set(&survivor)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    append_queue_entry(
                        conn,
                        SyncTable::FastBlocks,
                        SyncOperation::Update,
                        &survivor.id,
                        &serde_json::to_value(&survivor)?,
                    )?;
                }

                Ok(affected)
            })
            .await?;

        if affected > 0 {
            self.notifier
                .publish(StoreEvent::TableChanged(SyncTable::FastBlocks));
            self.notifier.publish(StoreEvent::QueueChanged);
        }
        Ok(affected)
    }
}

pub struct FastDayRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    notifier: ChangeNotifier,
}

impl FastDayRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, notifier: ChangeNotifier) -> Self {
        Self {
            pool,
            writer,
            notifier,
        }
    }

    pub async fn replace_from_remote(
        &self,
        rows: Vec<FastDay>,
        synced_at: String,
    ) -> Result<usize> {
        let applied = self
            .writer
            .exec(move |conn| {
                let mut applied = 0usize;
                for day in rows {
                    let mut row = FastDayDB::from(day);
                    row.pending_sync = false;
                    row.last_synced = Some(synced_at.clone());
                    diesel::insert_into(fast_days::table)
                        .values(&row)
                        .on_conflict(fast_days::id)
                        .do_update()
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    applied += 1;
                }
                Ok(applied)
            })
            .await?;
        if applied > 0 {
            self.notifier
                .publish(StoreEvent::TableChanged(SyncTable::FastDays));
        }
        Ok(applied)
    }

    pub async fn mark_record_synced(&self, day_id: String, synced_at: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(fast_days::table.find(day_id))
                    .set((
                        fast_days::pending_sync.eq(false),
                        fast_days::last_synced.eq(Some(synced_at)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        self.notifier
            .publish(StoreEvent::TableChanged(SyncTable::FastDays));
        Ok(())
    }
}

#[async_trait]
impl FastDayRepositoryTrait for FastDayRepository {
    fn get(&self, day_id: &str) -> Result<Option<FastDay>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fast_days::table
            .find(day_id)
            .first::<FastDayDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(FastDay::from))
    }

    fn list_for_fast(&self, parent: &str) -> Result<Vec<FastDay>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = fast_days::table
            .filter(fast_days::fast_id.eq(parent))
            .order(fast_days::date.asc())
            .load::<FastDayDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(FastDay::from).collect())
    }

    fn find_by_date(&self, parent: &str, day: &str) -> Result<Option<FastDay>> {
        let mut conn = get_connection(&self.pool)?;
        let row = fast_days::table
            .filter(fast_days::fast_id.eq(parent))
            .filter(fast_days::date.eq(day))
            .first::<FastDayDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(FastDay::from))
    }

    async fn create(&self, new_day: NewFastDay) -> Result<FastDay> {
        let day = self
            .writer
            .exec(move |conn| {
                let row = FastDayDB {
                    id: Uuid::new_v4().to_string(),
                    fast_id: new_day.fast_id,
                    block_id: new_day.block_id,
                    date: new_day.date,
                    completed: new_day.completed,
                    created_at: Utc::now().to_rfc3339(),
                    pending_sync: true,
                    last_synced: None,
                };

                diesel::insert_into(fast_days::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_queue_entry(
                    conn,
                    SyncTable::FastDays,
                    SyncOperation::Insert,
                    &row.id,
                    &serde_json::to_value(&row)?,
                )?;
                Ok(FastDay::from(row))
            })
            .await?;

        self.notifier
            .publish(StoreEvent::TableChanged(SyncTable::FastDays));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(day)
    }

    async fn update(&self, day_id: String, patch: FastDayPatch) -> Result<FastDay> {
        let day = self
            .writer
            .exec(move |conn| {
                let mut row = fast_days::table
                    .find(&day_id)
                    .first::<FastDayDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::not_found(format!("day '{}'", day_id)))?;

                if let Some(completed) = patch.completed {
                    row.completed = completed;
                }
                if let Some(block) = patch.block_id {
                    row.block_id = block;
                }
                row.pending_sync = true;

                diesel::update(fast_days::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                append_queue_entry(
                    conn,
                    SyncTable::FastDays,
                    SyncOperation::Update,
                    &row.id,
                    &serde_json::to_value(&row)?,
                )?;
                Ok(FastDay::from(row))
            })
            .await?;

        self.notifier
            .publish(StoreEvent::TableChanged(SyncTable::FastDays));
        self.notifier.publish(StoreEvent::QueueChanged);
        Ok(day)
    }

    async fn delete(&self, day_id: String) -> Result<usize> {
        let affected = self
            .writer
            .exec(move |conn| {
                let affected = diesel::delete(fast_days::table.find(&day_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected > 0 {
                    append_queue_entry(
                        conn,
                        SyncTable::FastDays,
                        SyncOperation::Delete,
                        &day_id,
                        &serde_json::json!({ "id": day_id }),
                    )?;
                }
                Ok(affected)
            })
            .await?;

        if affected > 0 {
            self.notifier
                .publish(StoreEvent::TableChanged(SyncTable::FastDays));
            self.notifier.publish(StoreEvent::QueueChanged);
        }
        Ok(affected)
    }
}
