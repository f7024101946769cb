//! In-memory reporter with no display.

use crate::cancel::CancelSignal;
use crate::error::ProgressError;
use crate::reporter::{check_progress, ProgressReporter};

pub const DEFAULT_MAXIMUM: u64 = 100;

/// Keeps the full progress state in memory.
///
/// Useful as the root of a composed tree when the host polls the state
/// itself, and as the reference implementation of the contract. Cancellation
/// is requested through the handle returned by
/// [`cancel_handle`](Self::cancel_handle).
#[derive(Debug)]
pub struct MemoryReporter {
    caption: Option<String>,
    maximum: u64,
    progress: Option<u64>,
    cancel: CancelSignal,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self {
            caption: None,
            maximum: DEFAULT_MAXIMUM,
            progress: Some(0),
            cancel: CancelSignal::new(),
        }
    }

    /// Creates a reporter with the given maximum and progress already set.
    pub fn with_progress(maximum: u64, progress: Option<u64>) -> Result<Self, ProgressError> {
        check_progress(progress, maximum)?;
        Ok(Self {
            maximum,
            progress,
            ..Self::new()
        })
    }

    pub fn cancel_handle(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn cancel(&self) -> Result<(), ProgressError> {
        self.cancel.cancel()
    }
}

impl Default for MemoryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for MemoryReporter {
    fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    fn set_caption(&mut self, caption: Option<&str>) {
        self.caption = caption.map(str::to_string);
    }

    fn maximum(&self) -> u64 {
        self.maximum
    }

    fn set_maximum(&mut self, maximum: u64) -> Result<(), ProgressError> {
        self.maximum = maximum;
        self.progress = self.progress.map(|p| p.min(maximum));
        Ok(())
    }

    fn progress(&self) -> Option<u64> {
        self.progress
    }

    fn set_progress(&mut self, progress: Option<u64>) -> Result<(), ProgressError> {
        check_progress(progress, self.maximum)?;
        self.progress = progress;
        Ok(())
    }

    fn allow_cancellation(&self) -> bool {
        self.cancel.is_allowed()
    }

    fn set_allow_cancellation(&mut self, allow: bool) {
        self.cancel.set_allowed(allow);
    }

    fn was_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }
}
