//! SQLite storage for the Vigil offline mirror: mirrored entity tables,
//! the durable mutation queue, engine state, and change notification.

pub mod db;
pub mod errors;
pub mod events;
pub mod fasts;
pub mod queue;
pub mod schema;
pub mod state;

pub use db::{create_pool, get_connection, open, run_migrations, DbPool, WriteHandle};
pub use errors::StorageError;
pub use events::ChangeNotifier;
pub use fasts::{FastBlockRepository, FastDayRepository, FastRepository};
pub use queue::{append_queue_entry, SyncQueueRepository};
pub use state::SyncStateRepository;

#[cfg(test)]
pub(crate) mod test_support;
