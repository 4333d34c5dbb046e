//! SQLite persistence for the mirrored fasting entities.

mod model;
mod repository;

pub use model::{FastBlockDB, FastDB, FastDayDB};
pub use repository::{FastBlockRepository, FastDayRepository, FastRepository};
