//! Shared fixtures for storage tests.

use std::sync::Arc;
use tempfile::TempDir;

use crate::db::{open, DbPool, WriteHandle};

/// Open a migrated database in a fresh temp dir. Keep the `TempDir` alive
/// for the duration of the test.
pub fn open_test_db() -> (TempDir, Arc<DbPool>, WriteHandle) {
    let dir = TempDir::new().expect("create temp dir");
    let url = dir
        .path()
        .join("vigil-test.db")
        .to_string_lossy()
        .to_string();
    let (pool, writer) = open(&url).expect("open test database");
    (dir, pool, writer)
}
