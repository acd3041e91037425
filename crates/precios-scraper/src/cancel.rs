//! Cooperative cancellation.
//!
//! Cancellation is polled, never pushed: the fetch layer checks the token
//! immediately before every outbound request and the orchestrator checks it
//! at the top of each vendor iteration. Once the probe reports `true` the
//! run unwinds with [`crate::ScrapeError::Cancelled`] and no partial result
//! is returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable handle around a caller-supplied cancellation predicate.
#[derive(Clone)]
pub struct CancelToken {
    probe: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl CancelToken {
    /// A token that never cancels.
    #[must_use]
    pub fn none() -> Self {
        Self::from_fn(|| false)
    }

    /// Wraps an arbitrary predicate. The predicate must be cheap: it is
    /// evaluated before every outbound request.
    pub fn from_fn(probe: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            probe: Arc::new(probe),
        }
    }

    /// A token backed by a shared flag. Setting the flag cancels the run at
    /// the next poll point.
    #[must_use]
    pub fn flag() -> (Self, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        let probe_flag = Arc::clone(&flag);
        (
            Self::from_fn(move || probe_flag.load(Ordering::Relaxed)),
            flag,
        )
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        (self.probe)()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
