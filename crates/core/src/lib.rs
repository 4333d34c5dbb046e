//! Core domain for the Vigil offline mirror: fasting entities, repository
//! contracts, and sync policy shared by the storage and engine crates.

pub mod errors;
pub mod fasts;
pub mod session;
pub mod sync;

pub use errors::{Error, Result};
