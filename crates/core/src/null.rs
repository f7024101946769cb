//! The reporter to pass when no progress display is needed.

use crate::error::ProgressError;
use crate::reporter::ProgressReporter;

/// Accepts and discards every write.
///
/// Reads report an empty caption, a maximum of 0 and a progress of 0.
/// Cancellation is never allowed and never requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn caption(&self) -> Option<&str> {
        None
    }

    fn set_caption(&mut self, _caption: Option<&str>) {}

    fn maximum(&self) -> u64 {
        0
    }

    fn set_maximum(&mut self, _maximum: u64) -> Result<(), ProgressError> {
        Ok(())
    }

    fn progress(&self) -> Option<u64> {
        Some(0)
    }

    fn set_progress(&mut self, _progress: Option<u64>) -> Result<(), ProgressError> {
        Ok(())
    }

    fn validate_progress(&self, _progress: Option<u64>) -> Result<(), ProgressError> {
        Ok(())
    }

    fn allow_cancellation(&self) -> bool {
        false
    }

    fn set_allow_cancellation(&mut self, _allow: bool) {}

    fn was_canceled(&self) -> bool {
        false
    }
}
