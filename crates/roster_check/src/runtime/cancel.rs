//! Cooperative cancellation for validation passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, advisory cancellation flag.
///
/// Clones observe the same flag. Work that holds a token polls [`CancelToken::is_cancelled`] at
/// its own checkpoints; setting the flag never interrupts I/O that is already in flight.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation has been requested, for use with `?` at checkpoints.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Marker returned from a checkpoint after cancellation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cancelled;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation_state() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert_eq!(observer.checkpoint(), Ok(()));
        token.cancel();
        assert!(observer.is_cancelled());
        assert_eq!(observer.checkpoint(), Err(Cancelled));
    }
}
