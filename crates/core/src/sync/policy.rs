//! Retry and backoff policy for queue replay.

use serde::{Deserialize, Serialize};

/// Replay attempts after which a queue entry is dead-lettered instead of
/// rescheduled. Dead entries stay in the queue table for manual resolution.
pub const MAX_REPLAY_ATTEMPTS: i32 = 10;

/// Retry policy classification for remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncRetryClass {
    Retryable,
    Permanent,
    ReauthRequired,
}

/// Classify HTTP status into retry behavior.
pub fn classify_http_status(status: u16) -> SyncRetryClass {
    match status {
        401 | 403 => SyncRetryClass::ReauthRequired,
        408 | 409 | 423 | 425 | 429 => SyncRetryClass::Retryable,
        500..=599 => SyncRetryClass::Retryable,
        _ => SyncRetryClass::Permanent,
    }
}

/// Exponential backoff in seconds with cap.
pub fn backoff_seconds(attempts: i32) -> i64 {
    const MAX_EXPONENT: i32 = 8;
    const BASE_DELAY_SECONDS: i64 = 5;

    let capped = attempts.clamp(0, MAX_EXPONENT);
    2_i64.pow(capped as u32) * BASE_DELAY_SECONDS
}
