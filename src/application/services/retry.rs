//! # Durable Write Retrier
//!
//! Retries a persistence call with a fixed backoff.
//!
//! An error is retried only when the root of its `source()` chain is a
//! [`RepositoryError`]. Any other error is handed back unchanged as
//! [`DurableWriteError::Rejected`] after a single attempt.
//!
//! ```text
//! attempt 1 ── fail ── sleep(backoff) ── attempt 2 ── fail ── ... ── attempt N ── fail ── Exhausted
//!                          │
//!                      cancelled ── Interrupted
//! ```
//!
//! # Examples
//!
//! ```
//! use asset_aggregator::application::services::retry::{DurableWriteRetrier, RetryConfig};
//! use asset_aggregator::infrastructure::persistence::RepositoryError;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let retrier = DurableWriteRetrier::new(RetryConfig::new(3, Duration::ZERO).unwrap());
//! let result: Result<u32, _> = retrier
//!     .execute("Failed to persist", || async { Err(RepositoryError::connection("down")) })
//!     .await;
//! assert_eq!(result.unwrap_err().attempts(), 3);
//! # });
//! ```

use crate::application::cancellation::CancellationSignal;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::infrastructure::persistence::RepositoryError;
use std::error::Error;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Default number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

/// Retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryConfig {
    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if `max_attempts` is zero.
    pub fn new(max_attempts: u32, backoff: Duration) -> ApplicationResult<Self> {
        if max_attempts == 0 {
            return Err(ApplicationError::configuration(
                "write_retry.max_attempts must be at least 1",
            ));
        }
        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    /// Returns the maximum number of attempts.
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between attempts.
    #[inline]
    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Failure of a retried write.
#[derive(Debug, Error)]
pub enum DurableWriteError<E> {
    /// Every attempt failed with a persistence error.
    #[error("{context} after {attempts} attempts")]
    Exhausted {
        /// Caller-supplied failure description.
        context: String,
        /// Attempts made.
        attempts: u32,
        /// Error from the last attempt.
        #[source]
        source: E,
    },

    /// Cancellation arrived while waiting to retry.
    #[error("{context}: retry interrupted after {attempts} attempts")]
    Interrupted {
        /// Caller-supplied failure description.
        context: String,
        /// Attempts made before the interruption.
        attempts: u32,
    },

    /// A non-persistence error, propagated without retrying.
    #[error(transparent)]
    Rejected(E),
}

impl<E> DurableWriteError<E> {
    /// Number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Interrupted { attempts, .. } => *attempts,
            Self::Rejected(_) => 1,
        }
    }

    /// Returns true if retries ran out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns true if the retry loop was cancelled.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

/// Returns true if the root cause of `error` is a [`RepositoryError`].
#[must_use]
pub fn is_persistence_failure(error: &(dyn Error + 'static)) -> bool {
    let mut current = error;
    while let Some(next) = current.source() {
        current = next;
    }
    current.is::<RepositoryError>()
}

/// Retries persistence calls according to a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct DurableWriteRetrier {
    config: RetryConfig,
}

impl DurableWriteRetrier {
    /// Creates a retrier.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the policy.
    #[must_use]
    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Runs `action` until it succeeds, fails with a non-persistence error,
    /// or runs out of attempts.
    ///
    /// # Errors
    ///
    /// Returns `Exhausted` after `max_attempts` persistence failures and
    /// `Rejected` for any other error.
    pub async fn execute<T, E, F, Fut>(
        &self,
        context: &str,
        action: F,
    ) -> Result<T, DurableWriteError<E>>
    where
        E: Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(context, None, action).await
    }

    /// Like [`execute`](Self::execute), but a cancellation observed between
    /// attempts ends the loop.
    ///
    /// # Errors
    ///
    /// Additionally returns `Interrupted` when `signal` fires before the
    /// next attempt starts.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        context: &str,
        signal: &CancellationSignal,
        action: F,
    ) -> Result<T, DurableWriteError<E>>
    where
        E: Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(context, Some(signal), action).await
    }

    async fn run<T, E, F, Fut>(
        &self,
        context: &str,
        signal: Option<&CancellationSignal>,
        mut action: F,
    ) -> Result<T, DurableWriteError<E>>
    where
        E: Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match action().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !is_persistence_failure(&error) {
                return Err(DurableWriteError::Rejected(error));
            }
            if attempt >= max_attempts {
                warn!(context, attempts = attempt, error = %error, "durable write exhausted");
                return Err(DurableWriteError::Exhausted {
                    context: context.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            warn!(context, attempt, max_attempts, error = %error, "durable write failed, retrying");
            if !self.pause(signal).await {
                return Err(DurableWriteError::Interrupted {
                    context: context.to_string(),
                    attempts: attempt,
                });
            }
        }
    }

    /// Sleeps for the backoff. Returns false if cancelled.
    async fn pause(&self, signal: Option<&CancellationSignal>) -> bool {
        let backoff = self.config.backoff;
        match signal {
            Some(signal) if signal.is_cancelled() => false,
            Some(signal) if !backoff.is_zero() => {
                tokio::select! {
                    () = tokio::time::sleep(backoff) => true,
                    () = signal.cancelled() => false,
                }
            }
            _ => {
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
                true
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Error)]
    #[error("wrapped: {0}")]
    struct Wrapper(#[source] RepositoryError);

    #[derive(Debug, Error)]
    #[error("validation failed")]
    struct NotPersistence;

    fn retrier(max_attempts: u32) -> DurableWriteRetrier {
        DurableWriteRetrier::new(RetryConfig::new(max_attempts, Duration::ZERO).unwrap())
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert!(RetryConfig::new(0, Duration::ZERO).is_err());
        assert_eq!(RetryConfig::default().max_attempts(), 3);
        assert_eq!(RetryConfig::default().backoff(), Duration::from_millis(100));
    }

    #[test]
    fn root_cause_classification() {
        let direct = RepositoryError::query("x");
        let wrapped = Wrapper(RepositoryError::connection("y"));
        assert!(is_persistence_failure(&direct));
        assert!(is_persistence_failure(&wrapped));
        assert!(!is_persistence_failure(&NotPersistence));
    }

    #[tokio::test]
    async fn succeeds_on_last_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result = retrier(3)
            .execute("write", move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(RepositoryError::connection("flaky"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let err = retrier(4)
            .execute("Failed to persist bank assets for customer C001", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(Wrapper(RepositoryError::query("write failed"))) }
            })
            .await
            .unwrap_err();

        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            err.to_string(),
            "Failed to persist bank assets for customer C001 after 4 attempts"
        );
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn non_persistence_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let err = retrier(5)
            .execute("write", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(NotPersistence) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DurableWriteError::Rejected(NotPersistence)));
        assert_eq!(err.to_string(), "validation failed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_between_attempts_only() {
        let retrier =
            DurableWriteRetrier::new(RetryConfig::new(3, Duration::from_millis(100)).unwrap());
        let started = tokio::time::Instant::now();
        let _ = retrier
            .execute("write", || async {
                Err::<(), _>(RepositoryError::connection("down"))
            })
            .await;
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn cancellation_during_backoff_interrupts() {
        let retrier =
            DurableWriteRetrier::new(RetryConfig::new(5, Duration::from_secs(30)).unwrap());
        let signal = CancellationSignal::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let canceller = {
            let signal = signal.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                signal.cancel();
            })
        };

        let err = retrier
            .execute_cancellable("write", &signal, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(RepositoryError::connection("down")) }
            })
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_interrupted());
        assert_eq!(err.attempts(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
