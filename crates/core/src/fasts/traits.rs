//! Repository contracts implemented by the storage crate.
//!
//! Reads are synchronous (pooled connection, no transaction); writes are
//! async because they go through the single-writer handle. Every write is
//! one transaction covering the entity row and its queue entry.

use async_trait::async_trait;

use crate::errors::Result;
use crate::fasts::{
    Fast, FastBlock, FastBlockPatch, FastDay, FastDayPatch, FastPatch, NewFast, NewFastBlock,
    NewFastDay,
};

#[async_trait]
pub trait FastRepositoryTrait: Send + Sync {
    fn get(&self, fast_id: &str) -> Result<Option<Fast>>;
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Fast>>;
    fn active_for_user(&self, user_id: &str) -> Result<Option<Fast>>;

    async fn create(&self, new_fast: NewFast, user_id: String) -> Result<Fast>;
    async fn update(&self, fast_id: String, patch: FastPatch) -> Result<Fast>;
    /// Deletes the fast and its child blocks/days locally; enqueues one
    /// delete for the fast itself (the remote cascades to children).
    async fn delete(&self, fast_id: String) -> Result<usize>;
    /// Deactivates every other active fast of the user, then activates the
    /// target; each touched row enqueues its own update.
    async fn set_active(&self, fast_id: String, user_id: String) -> Result<Fast>;
}

#[async_trait]
pub trait FastBlockRepositoryTrait: Send + Sync {
    fn get(&self, block_id: &str) -> Result<Option<FastBlock>>;
    /// Blocks of a fast ordered by `order_index`.
    fn list_for_fast(&self, fast_id: &str) -> Result<Vec<FastBlock>>;

    async fn create(&self, new_block: NewFastBlock) -> Result<FastBlock>;
    async fn update(&self, block_id: String, patch: FastBlockPatch) -> Result<FastBlock>;
    /// Deletes the block and re-indexes survivors to contiguous order.
    async fn delete(&self, block_id: String) -> Result<usize>;
}

#[async_trait]
pub trait FastDayRepositoryTrait: Send + Sync {
    fn get(&self, day_id: &str) -> Result<Option<FastDay>>;
    fn list_for_fast(&self, fast_id: &str) -> Result<Vec<FastDay>>;
    fn find_by_date(&self, fast_id: &str, date: &str) -> Result<Option<FastDay>>;

    async fn create(&self, new_day: NewFastDay) -> Result<FastDay>;
    async fn update(&self, day_id: String, patch: FastDayPatch) -> Result<FastDay>;
    async fn delete(&self, day_id: String) -> Result<usize>;
}
