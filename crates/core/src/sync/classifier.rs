//! Failure classification for remote store calls.
//!
//! Precedence matters: an auth phrase wins over a 5xx status because no
//! amount of retrying gets past a revoked credential.

use stocksync_domain::constants::{NON_RETRYABLE_STATUS_CODES, RETRYABLE_STATUS_CODES};
use stocksync_domain::SyncErrorType;

const AUTH_PATTERNS: &[&str] = &[
    "unauthorized",
    "forbidden",
    "invalid api key",
    "access denied",
    "access token",
    "revoked",
    "invalid token",
    "authentication",
];

/// Auth status codes quoted in message text. Matched as whole tokens only,
/// so ids and numbers that merely contain the digits do not count.
const AUTH_STATUS_TOKENS: &[&str] = &["401", "403"];

const NETWORK_PATTERNS: &[&str] = &[
    "econnrefused",
    "enotfound",
    "etimedout",
    "econnreset",
    "timeout",
    "timed out",
    "network",
    "connection",
    "dns",
    "unreachable",
];

const PARTIAL_FAILURE_PATTERNS: &[&str] = &["partial", "some items", "user error"];

/// Classify a failed call from its HTTP status (if any) and message.
///
/// Never returns [`SyncErrorType::Unknown`]: unrecognised failures are
/// assumed retryable and map to [`SyncErrorType::Transient`].
pub fn classify_error(http_status: Option<u16>, message: &str) -> SyncErrorType {
    let message = message.to_lowercase();

    if matches!(http_status, Some(401 | 403))
        || contains_any(&message, AUTH_PATTERNS)
        || contains_token(&message, AUTH_STATUS_TOKENS)
    {
        return SyncErrorType::AuthRevoked;
    }

    match http_status {
        Some(429) => return SyncErrorType::RateLimited,
        Some(500..=599) => return SyncErrorType::StoreUnreachable,
        _ => {}
    }

    if contains_any(&message, NETWORK_PATTERNS) {
        SyncErrorType::StoreUnreachable
    } else if contains_any(&message, PARTIAL_FAILURE_PATTERNS) {
        SyncErrorType::PartialFailure
    } else {
        SyncErrorType::Transient
    }
}

/// Statuses that must never be retried.
pub fn is_non_retryable_status(status: u16) -> bool {
    NON_RETRYABLE_STATUS_CODES.contains(&status)
}

/// Statuses known to be transient.
///
/// Anything outside both sets is still retried through the `transient`
/// default.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUS_CODES.contains(&status)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn contains_token(haystack: &str, tokens: &[&str]) -> bool {
    haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| tokens.contains(&word))
}
