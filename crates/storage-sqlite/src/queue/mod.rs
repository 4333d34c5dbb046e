//! Durable mutation queue: the single record of what must still be told
//! to the server.

mod model;
mod repository;

pub use model::{NewSyncQueueEntryDB, SyncQueueEntryDB};
pub use repository::{append_queue_entry, SyncQueueRepository};
