//! Cooperative cancellation latch shared between a reporter and its input side.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::ProgressError;

const DISALLOWED: u8 = 0;
const ALLOWED: u8 = 1;
const CANCELED: u8 = 2;

/// A cloneable handle to one cancellation latch.
///
/// The operation side toggles [`set_allowed`](Self::set_allowed) through its
/// reporter; the input side (a key handler, a dialog button, a task
/// supervisor) holds a clone and calls [`cancel`](Self::cancel). The latch is
/// only meaningful within one cancellable session: every call to
/// `set_allowed` starts a new session with nothing latched.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    state: Arc<AtomicU8>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_allowed(&self, allow: bool) {
        let next = if allow { ALLOWED } else { DISALLOWED };
        self.state.store(next, Ordering::SeqCst);
    }

    pub fn is_allowed(&self) -> bool {
        self.state.load(Ordering::SeqCst) != DISALLOWED
    }

    pub fn is_canceled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CANCELED
    }

    /// Requests cancellation of the current session.
    ///
    /// Fails with [`ProgressError::InvalidState`] when no cancellable session
    /// is active. Cancelling twice in one session is a no-op.
    pub fn cancel(&self) -> Result<(), ProgressError> {
        match self
            .state
            .compare_exchange(ALLOWED, CANCELED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) | Err(CANCELED) => {
                tracing::debug!("Cancellation requested");
                Ok(())
            }
            Err(_) => Err(ProgressError::InvalidState(
                "cancellation is not allowed for this operation".to_string(),
            )),
        }
    }
}
