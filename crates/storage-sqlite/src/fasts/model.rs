//! Database models for the mirrored entity tables.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use vigil_core::fasts::{Fast, FastBlock, FastDay};

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
#[diesel(table_name = crate::schema::fasts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FastDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_days: i32,
    pub start_date: String,
    pub days_completed_before_app: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub pending_sync: bool,
    pub last_synced: Option<String>,
}

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
#[diesel(table_name = crate::schema::fast_blocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FastBlockDB {
    pub id: String,
    pub fast_id: String,
    pub name: String,
    pub total_days: i32,
    pub order_index: i32,
    pub manually_completed: bool,
    pub created_at: String,
    pub pending_sync: bool,
    pub last_synced: Option<String>,
}

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
#[diesel(table_name = crate::schema::fast_days)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FastDayDB {
    pub id: String,
    pub fast_id: String,
    pub block_id: Option<String>,
    pub date: String,
    pub completed: bool,
    pub created_at: String,
    pub pending_sync: bool,
    pub last_synced: Option<String>,
}

impl From<FastDB> for Fast {
    fn from(row: FastDB) -> Self {
        Fast {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            total_days: row.total_days,
            start_date: row.start_date,
            days_completed_before_app: row.days_completed_before_app,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            pending_sync: row.pending_sync,
            last_synced: row.last_synced,
        }
    }
}

impl From<Fast> for FastDB {
    fn from(fast: Fast) -> Self {
        FastDB {
            id: fast.id,
            user_id: fast.user_id,
            name: fast.name,
            total_days: fast.total_days,
            start_date: fast.start_date,
            days_completed_before_app: fast.days_completed_before_app,
            is_active: fast.is_active,
            created_at: fast.created_at,
            updated_at: fast.updated_at,
            pending_sync: fast.pending_sync,
            last_synced: fast.last_synced,
        }
    }
}

impl From<FastBlockDB> for FastBlock {
    fn from(row: FastBlockDB) -> Self {
        FastBlock {
            id: row.id,
            fast_id: row.fast_id,
            name: row.name,
            total_days: row.total_days,
            order_index: row.order_index,
            manually_completed: row.manually_completed,
            created_at: row.created_at,
            pending_sync: row.pending_sync,
            last_synced: row.last_synced,
        }
    }
}

impl From<FastBlock> for FastBlockDB {
    fn from(block: FastBlock) -> Self {
        FastBlockDB {
            id: block.id,
            fast_id: block.fast_id,
            name: block.name,
            total_days: block.total_days,
            order_index: block.order_index,
            manually_completed: block.manually_completed,
            created_at: block.created_at,
            pending_sync: block.pending_sync,
            last_synced: block.last_synced,
        }
    }
}

impl From<FastDayDB> for FastDay {
    fn from(row: FastDayDB) -> Self {
        FastDay {
            id: row.id,
            fast_id: row.fast_id,
            block_id: row.block_id,
            date: row.date,
            completed: row.completed,
            created_at: row.created_at,
            pending_sync: row.pending_sync,
            last_synced: row.last_synced,
        }
    }
}

impl From<FastDay> for FastDayDB {
    fn from(day: FastDay) -> Self {
        FastDayDB {
            id: day.id,
            fast_id: day.fast_id,
            block_id: day.block_id,
            date: day.date,
            completed: day.completed,
            created_at: day.created_at,
            pending_sync: day.pending_sync,
            last_synced: day.last_synced,
        }
    }
}
