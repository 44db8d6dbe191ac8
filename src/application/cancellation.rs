//! # Cancellation
//!
//! A cloneable, one-shot cancellation flag that async code can await.
//!
//! Cancelling is idempotent and visible to every clone. Waiters that start
//! after cancellation return immediately.
//!
//! # Examples
//!
//! ```
//! use asset_aggregator::application::cancellation::CancellationSignal;
//!
//! let signal = CancellationSignal::new();
//! let observer = signal.clone();
//! signal.cancel();
//! assert!(observer.is_cancelled());
//! ```

use std::sync::Arc;
use tokio::sync::watch;

/// Shared cancellation flag.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationSignal {
    /// Creates a signal in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes when cancellation is requested.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}
