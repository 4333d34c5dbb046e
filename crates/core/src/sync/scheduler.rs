//! Scheduler constants for the sync monitor.

/// Periodic sync cadence in seconds while online.
pub const SYNC_PERIODIC_INTERVAL_SECS: u64 = 60;

/// Maximum jitter (seconds) added to periodic cycle intervals.
pub const SYNC_INTERVAL_JITTER_SECS: u64 = 5;

/// Shortened delay (milliseconds) when queue entries are already due.
pub const SYNC_PENDING_SHORT_DELAY_MS: u64 = 2_000;

/// Delay before retrying after the backend demanded fresh credentials.
pub const REAUTH_RETRY_DELAY_SECS: i64 = 30;

/// Delay before retrying after a failed pull phase.
pub const PULL_RETRY_DELAY_SECS: i64 = 10;
