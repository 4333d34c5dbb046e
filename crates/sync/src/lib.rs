//! Sync engine and connectivity monitor for the Vigil offline mirror.
//!
//! The engine reconciles local and remote state push-then-pull; the
//! monitor decides when cycles run and exposes observable status.

mod engine;
mod monitor;

pub use engine::SyncEngine;
pub use monitor::{SyncMonitor, SyncStatusSnapshot};

#[cfg(test)]
pub(crate) mod test_support;
