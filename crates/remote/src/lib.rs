//! Remote backend boundary: the table-oriented interface the sync engine
//! pushes to and pulls from, plus the REST client implementing it.

mod backend;
mod client;
mod config;
mod error;
mod types;

pub use backend::RemoteBackend;
pub use client::RestBackend;
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use types::{ApiErrorResponse, RemoteFilter, Session};
