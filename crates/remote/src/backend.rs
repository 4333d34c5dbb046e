//! The table-oriented remote interface consumed by the sync engine.

use async_trait::async_trait;
use vigil_core::sync::SyncTable;

use crate::error::RemoteResult;
use crate::types::RemoteFilter;

/// Authenticated remote data backend keyed by table name and record id.
///
/// All operations require a resolvable session; `current_user` returning
/// `None` means "nothing to sync", not an error.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn insert(&self, table: SyncTable, record: serde_json::Value) -> RemoteResult<()>;

    async fn update(
        &self,
        table: SyncTable,
        record_id: &str,
        record: serde_json::Value,
    ) -> RemoteResult<()>;

    async fn delete(&self, table: SyncTable, record_id: &str) -> RemoteResult<()>;

    async fn select_where(
        &self,
        table: SyncTable,
        filters: &[RemoteFilter],
    ) -> RemoteResult<Vec<serde_json::Value>>;

    async fn current_user(&self) -> RemoteResult<Option<String>>;
}
