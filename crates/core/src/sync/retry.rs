//! Retry executor for remote store reads.
//!
//! Delays come from a fixed table (`[100ms, 500ms]` by default) and clamp to
//! the last entry; this is linear backoff, not exponential.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use stocksync_domain::{SyncConfig, SyncErrorType};
use tracing::{debug, warn};

use super::classifier::{classify_error, is_non_retryable_status};

/// One failed attempt as reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub message: String,
    pub http_status: Option<u16>,
}

impl AttemptFailure {
    /// Failure without an HTTP response (transport error, decode error).
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), http_status: None }
    }

    pub fn with_status(http_status: u16, message: impl Into<String>) -> Self {
        Self { message: message.into(), http_status: Some(http_status) }
    }

    pub fn error_type(&self) -> SyncErrorType {
        classify_error(self.http_status, &self.message)
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for AttemptFailure {}

/// Final failure of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    pub error: String,
    pub http_status: Option<u16>,
    pub error_type: SyncErrorType,
}

impl From<AttemptFailure> for RetryFailure {
    fn from(failure: AttemptFailure) -> Self {
        let error_type = failure.error_type();
        Self { error: failure.to_string(), http_status: failure.http_status, error_type }
    }
}

/// Result of a retried operation: either data or a failure, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    pub result: Result<T, RetryFailure>,
    /// Retries performed after the first attempt.
    pub retry_count: u32,
}

impl<T> RetryOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(|failure| failure.error.as_str())
    }

    pub fn http_status(&self) -> Option<u16> {
        self.result.as_ref().err().and_then(|failure| failure.http_status)
    }

    pub fn error_type(&self) -> Option<SyncErrorType> {
        self.result.as_ref().err().map(|failure| failure.error_type)
    }
}

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delays: Vec<Duration>) -> Self {
        Self { max_retries, delays }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.max_retries, config.retry_delays())
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after the failed attempt at `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let index = usize::try_from(attempt).unwrap_or(usize::MAX);
        self.delays.get(index).or_else(|| self.delays.last()).copied().unwrap_or(Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Run `operation` up to `policy.max_attempts()` times.
///
/// Stops early on `auth_revoked` or a status in `{400, 401, 403, 404, 422}`.
/// Anything else is retried after the policy delay; once attempts run out
/// the last failure is returned, classified.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptFailure>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt: u32 = 0;

    loop {
        let failure = match operation().await {
            Ok(data) => return RetryOutcome { result: Ok(data), retry_count: attempt },
            Err(failure) => RetryFailure::from(failure),
        };

        let permanent = failure.error_type == SyncErrorType::AuthRevoked
            || failure.http_status.is_some_and(is_non_retryable_status);

        if permanent {
            debug!(
                attempt = attempt + 1,
                error_type = %failure.error_type,
                http_status = ?failure.http_status,
                "retry.permanent_failure"
            );
            return RetryOutcome { result: Err(failure), retry_count: attempt };
        }

        if attempt + 1 >= max_attempts {
            warn!(
                attempts = max_attempts,
                error_type = %failure.error_type,
                error = %failure.error,
                "retry.exhausted"
            );
            return RetryOutcome { result: Err(failure), retry_count: attempt };
        }

        let delay = policy.delay_for(attempt);
        debug!(
            attempt = attempt + 1,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error_type = %failure.error_type,
            "retry.scheduled"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn instant_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Vec::new())
    }

    async fn run_script(
        policy: &RetryPolicy,
        script: Vec<Result<&'static str, AttemptFailure>>,
    ) -> (RetryOutcome<&'static str>, u32) {
        let calls = AtomicU32::new(0);
        let outcome = with_retry(policy, || {
            let index = calls.fetch_add(1, Ordering::SeqCst) as usize;
            let step = script
                .get(index)
                .cloned()
                .unwrap_or_else(|| Err(AttemptFailure::new("script exhausted")));
            async move { step }
        })
        .await;
        (outcome, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_returns_zero_retries() {
        let (outcome, calls) = run_script(&instant_policy(2), vec![Ok("data")]).await;
        assert_eq!(outcome.data(), Some(&"data"));
        assert_eq!(outcome.error(), None);
        assert_eq!(outcome.retry_count, 0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let script = vec![
            Err(AttemptFailure::with_status(503, "Service Unavailable")),
            Err(AttemptFailure::new("socket hang up")),
            Ok("data"),
        ];
        let (outcome, calls) = run_script(&instant_policy(2), script).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.retry_count, 2);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn never_exceeds_max_attempts() {
        let script = vec![Err(AttemptFailure::with_status(500, "boom")); 10];
        let (outcome, calls) = run_script(&instant_policy(2), script).await;
        assert_eq!(calls, 3);
        assert_eq!(outcome.retry_count, 2);
        assert_eq!(outcome.error_type(), Some(SyncErrorType::StoreUnreachable));
        assert_eq!(outcome.http_status(), Some(500));
        assert_eq!(outcome.error(), Some("HTTP 500: boom"));
    }

    #[tokio::test]
    async fn auth_failures_stop_immediately() {
        let script = vec![Err(AttemptFailure::with_status(401, "Unauthorized")), Ok("data")];
        let (outcome, calls) = run_script(&instant_policy(2), script).await;
        assert_eq!(calls, 1);
        assert_eq!(outcome.retry_count, 0);
        assert_eq!(outcome.error_type(), Some(SyncErrorType::AuthRevoked));
    }

    #[tokio::test]
    async fn auth_text_without_status_stops_immediately() {
        let script = vec![Err(AttemptFailure::new("access token revoked")), Ok("data")];
        let (outcome, calls) = run_script(&instant_policy(2), script).await;
        assert_eq!(calls, 1);
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn permanent_statuses_stop_immediately() {
        for status in [400_u16, 404, 422] {
            let script = vec![Err(AttemptFailure::with_status(status, "bad")), Ok("data")];
            let (outcome, calls) = run_script(&instant_policy(2), script).await;
            assert_eq!(calls, 1, "status {status} must not be retried");
            assert_eq!(outcome.http_status(), Some(status));
        }
    }

    #[tokio::test]
    async fn unlisted_client_status_is_retried() {
        let script = vec![Err(AttemptFailure::with_status(418, "teapot")), Ok("data")];
        let (outcome, calls) = run_script(&instant_policy(2), script).await;
        assert_eq!(calls, 2);
        assert_eq!(outcome.retry_count, 1);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let script = vec![Err(AttemptFailure::with_status(503, "down")), Ok("data")];
        let (outcome, calls) = run_script(&instant_policy(0), script).await;
        assert_eq!(calls, 1);
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_per_delay_table() {
        let policy = RetryPolicy::default();
        let script = vec![Err(AttemptFailure::with_status(503, "down")); 3];
        let started = tokio::time::Instant::now();
        let (_, calls) = run_script(&policy, script).await;
        assert_eq!(calls, 3);
        assert_eq!(started.elapsed(), Duration::from_millis(600));
    }

    #[test]
    fn delay_table_clamps_to_last_entry() {
        let policy = RetryPolicy::new(5, vec![Duration::from_millis(100), Duration::from_millis(500)]);
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
        assert_eq!(instant_policy(3).delay_for(1), Duration::ZERO);
    }
}
