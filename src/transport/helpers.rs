//! Helpers shared by transport implementations and callers.
//!
//! - [`Deadline`] - bound a wait by time and by a [`CancelToken`]
//! - [`RetryConfig`] / [`retry_with_backoff`] - opt-in retry around a whole request
//! - [`job_name`] - unique remote file names for concurrent uploads

use crate::error::{Result, TaxsimError};
use crate::transport::traits::{TransportError, TransportErrorKind, TransportResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

// ============================================================================
// Cancellation
// ============================================================================

/// Shared flag that aborts a pending wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Deadline
// ============================================================================

/// Bounds a transport wait.
///
/// A timeout too large to represent as an [`Instant`] means the wait is only
/// bounded by cancellation.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Option<Instant>,
    timeout: Duration,
    poll_interval: Duration,
    cancel: Option<CancelToken>,
}

impl Deadline {
    #[must_use]
    pub fn after(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
            timeout,
            poll_interval,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: Option<CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at
            .map_or(Duration::MAX, |t| t.saturating_duration_since(Instant::now()))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Fails with `Cancelled` or `Timeout` when the wait must stop.
    ///
    /// # Errors
    ///
    /// Returns an error once the token is cancelled or the deadline has passed.
    pub fn check(&self) -> TransportResult<()> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(TransportError::new(
                TransportErrorKind::Cancelled,
                "request cancelled",
            ));
        }
        if self.expires_at.is_some_and(|t| Instant::now() >= t) {
            return Err(TransportError::new(
                TransportErrorKind::Timeout,
                format!("no result within {:?}", self.timeout),
            ));
        }
        Ok(())
    }

    /// Sleep one poll interval, never past the deadline.
    pub fn sleep(&self) {
        std::thread::sleep(self.poll_interval.min(self.remaining()));
    }

    /// Call `attempt` until it yields a value, sleeping between attempts.
    ///
    /// # Errors
    ///
    /// Returns the first error from `attempt`, or the deadline's error once it
    /// expires or is cancelled.
    pub fn poll<T, F>(&self, mut attempt: F) -> TransportResult<T>
    where
        F: FnMut() -> TransportResult<Option<T>>,
    {
        let mut polls = 0u32;
        loop {
            self.check()?;
            polls += 1;
            if let Some(v) = attempt()? {
                debug!(polls, "result ready");
                return Ok(v);
            }
            self.sleep();
        }
    }
}

// ============================================================================
// Retry
// ============================================================================

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Retry a whole request with exponential backoff.
///
/// Only [`TransportErrorKind::Unavailable`] is retried: a timed-out or
/// remote-failed request may already have been processed by the service, and
/// validation or decode errors would fail the same way again.
///
/// # Example
/// ```ignore
/// let result = retry_with_backoff(&RetryConfig::default(), || client.run(&table, &opts))?;
/// ```
///
/// # Errors
///
/// Returns the last error when it is not retryable or attempts are exhausted.
pub fn retry_with_backoff<F, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        attempt += 1;
        match operation() {
            Ok(result) => return Ok(result),
            Err(err) => {
                let should_retry = matches!(
                    &err,
                    TaxsimError::Transport(e) if e.kind == TransportErrorKind::Unavailable
                );
                if !should_retry || attempt >= config.max_attempts {
                    return Err(err);
                }
                warn!(attempt, delay_ms, error = %err, "retrying request");
                std::thread::sleep(Duration::from_millis(delay_ms));

                let next = (delay_ms as f64 * config.backoff_multiplier.max(1.0)) as u64;
                delay_ms = next.min(config.max_delay_ms);
            }
        }
    }
}

// ============================================================================
// Job names
// ============================================================================

static JOB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A remote file name unique across processes and concurrent calls.
#[must_use]
pub fn job_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let n = JOB_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("taxsim-{}-{millis}-{n}", std::process::id())
}
