//! Shared fixtures for engine and monitor tests: an in-memory scripted
//! remote plus a real on-disk storage stack.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use vigil_core::fasts::NewFast;
use vigil_core::sync::SyncTable;
use vigil_remote::{RemoteBackend, RemoteError, RemoteFilter, RemoteResult};
use vigil_storage_sqlite::{
    open, ChangeNotifier, FastBlockRepository, FastDayRepository, FastRepository,
    SyncQueueRepository, SyncStateRepository,
};

use crate::engine::SyncEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub table: SyncTable,
    pub record_id: String,
}

#[derive(Default)]
pub struct MockRemote {
    pub user: Mutex<Option<String>>,
    pub tables: Mutex<HashMap<SyncTable, Vec<serde_json::Value>>>,
    pub calls: Mutex<Vec<Call>>,
    /// record_id -> HTTP status to fail with
    pub failures: Mutex<HashMap<String, u16>>,
    /// HTTP status every select fails with, when set
    pub fail_selects: Mutex<Option<u16>>,
    /// When set, the next pull blocks until the sender fires.
    pub pull_gate: Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
}

impl MockRemote {
    pub fn with_user(user: &str) -> Self {
        let remote = Self::default();
        *remote.user.lock().unwrap() = Some(user.to_string());
        remote
    }

    pub fn fail_record(&self, record_id: &str, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .insert(record_id.to_string(), status);
    }

    pub fn fail_selects(&self, status: u16) {
        *self.fail_selects.lock().unwrap() = Some(status);
    }

    pub fn seed_row(&self, table: SyncTable, row: serde_json::Value) {
        self.tables.lock().unwrap().entry(table).or_default().push(row);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pull_count(&self, table: SyncTable) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.op == "select" && call.table == table)
            .count()
    }

    fn check_failure(&self, record_id: &str) -> RemoteResult<()> {
        if let Some(status) = self.failures.lock().unwrap().get(record_id) {
            return Err(RemoteError::api(*status, "injected failure"));
        }
        Ok(())
    }

    fn record(&self, op: &'static str, table: SyncTable, record_id: &str) {
        self.calls.lock().unwrap().push(Call {
            op,
            table,
            record_id: record_id.to_string(),
        });
    }
}

#[async_trait]
impl RemoteBackend for MockRemote {
    async fn insert(&self, table: SyncTable, record: serde_json::Value) -> RemoteResult<()> {
        let record_id = record["id"].as_str().unwrap_or_default().to_string();
        self.record("insert", table, &record_id);
        self.check_failure(&record_id)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        rows.retain(|row| row["id"] != record["id"]);
        rows.push(record);
        Ok(())
    }

    async fn update(
        &self,
        table: SyncTable,
        record_id: &str,
        record: serde_json::Value,
    ) -> RemoteResult<()> {
        self.record("update", table, record_id);
        self.check_failure(record_id)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        rows.retain(|row| row["id"] != record_id);
        rows.push(record);
        Ok(())
    }

    async fn delete(&self, table: SyncTable, record_id: &str) -> RemoteResult<()> {
        self.record("delete", table, record_id);
        self.check_failure(record_id)?;
        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(table)
            .or_default()
            .retain(|row| row["id"] != record_id);
        Ok(())
    }

    async fn select_where(
        &self,
        table: SyncTable,
        filters: &[RemoteFilter],
    ) -> RemoteResult<Vec<serde_json::Value>> {
        self.record("select", table, "");
        let gate = self.pull_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(status) = *self.fail_selects.lock().unwrap() {
            return Err(RemoteError::api(status, "injected pull failure"));
        }
        let rows = self
            .tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter(|row| {
                filters.iter().all(|filter| match filter {
                    RemoteFilter::Eq(column, value) => {
                        row[column].as_str() == Some(value.as_str())
                    }
                    RemoteFilter::In(column, values) => row[column]
                        .as_str()
                        .map(|v| values.iter().any(|candidate| candidate == v))
                        .unwrap_or(false),
                })
            })
            .collect())
    }

    async fn current_user(&self) -> RemoteResult<Option<String>> {
        Ok(self.user.lock().unwrap().clone())
    }
}

pub struct Fixture {
    pub _dir: TempDir,
    pub engine: Arc<SyncEngine>,
    pub remote: Arc<MockRemote>,
    pub fasts: Arc<FastRepository>,
    pub days: Arc<FastDayRepository>,
    pub queue: Arc<SyncQueueRepository>,
}

pub fn fixture(remote: MockRemote) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let url = dir.path().join("vigil.db").to_string_lossy().to_string();
    let (pool, writer) = open(&url).expect("open database");
    let notifier = ChangeNotifier::new();

    let fasts = Arc::new(FastRepository::new(
        pool.clone(),
        writer.clone(),
        notifier.clone(),
    ));
    let blocks = Arc::new(FastBlockRepository::new(
        pool.clone(),
        writer.clone(),
        notifier.clone(),
    ));
    let days = Arc::new(FastDayRepository::new(
        pool.clone(),
        writer.clone(),
        notifier.clone(),
    ));
    let queue = Arc::new(SyncQueueRepository::new(pool.clone(), writer.clone()));
    let state = Arc::new(SyncStateRepository::new(pool, writer));
    let remote = Arc::new(remote);

    let engine = Arc::new(SyncEngine::new(
        remote.clone(),
        fasts.clone(),
        blocks,
        days.clone(),
        queue.clone(),
        state,
        notifier,
    ));

    Fixture {
        _dir: dir,
        engine,
        remote,
        fasts,
        days,
        queue,
    }
}

pub fn new_fast(name: &str) -> NewFast {
    NewFast {
        name: name.to_string(),
        total_days: 21,
        start_date: "2024-03-01".to_string(),
        days_completed_before_app: 0,
        is_active: false,
    }
}
